use std::collections::BTreeMap;

use serde::Serialize;

/// A single structured log record: one span or event, folded into a flat,
/// serializable shape. No business decisions depend on this type (§4.12) —
/// it exists purely to be handed to a pluggable sink.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogRecord {
    #[serde(rename = "ts")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: Level,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(rename = "fields", skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<LogRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_flat_shape_the_sink_receives() {
        let mut fields = BTreeMap::new();
        fields.insert("doc_id".to_string(), serde_json::json!("ukpga/2006/46"));
        fields.insert("sections_ingested".to_string(), serde_json::json!(12));
        let record = LogRecord {
            timestamp: chrono::Utc::now(),
            level: Level::Info,
            message: "document ingested".to_string(),
            fields,
            spans: Vec::new(),
        };

        insta::assert_json_snapshot!(record, { ".ts" => "[ts]" }, @r###"
        {
          "fields": {
            "doc_id": "ukpga/2006/46",
            "sections_ingested": 12
          },
          "level": "info",
          "message": "document ingested",
          "ts": "[ts]"
        }
        "###);
    }

    #[test]
    fn empty_message_and_fields_are_omitted() {
        let record = LogRecord {
            timestamp: chrono::Utc::now(),
            level: Level::Debug,
            message: String::new(),
            fields: BTreeMap::new(),
            spans: Vec::new(),
        };

        insta::assert_json_snapshot!(record, { ".ts" => "[ts]" }, @r###"
        {
          "level": "debug",
          "ts": "[ts]"
        }
        "###);
    }
}
