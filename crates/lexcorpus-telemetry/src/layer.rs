use serde_json::json;

use crate::log_record::{Level, LogRecord};

/// A `tracing_subscriber::Layer` that folds spans and events into
/// [`LogRecord`]s and hands each event to a pluggable `handler` closure.
///
/// Grounded on the teacher's `ops::tracing::Layer`: spans are stored as an
/// extension on the `tracing_subscriber::registry` span, and events walk the
/// span scope from root to collect ancestor context. The wire format this
/// produces (JSON-via-serde) is what an external telemetry exporter would
/// ship onward — that shipping step is out of scope (§1).
pub struct Layer<H>
where
    H: Fn(LogRecord) + Send + Sync + 'static,
{
    handler: H,
}

impl<H> Layer<H>
where
    H: Fn(LogRecord) + Send + Sync + 'static,
{
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    fn record_from_metadata(&self, metadata: &tracing::Metadata) -> LogRecord {
        let mut record = LogRecord {
            timestamp: chrono::Utc::now(),
            level: Level::from(metadata.level()),
            message: String::new(),
            fields: Default::default(),
            spans: Vec::new(),
        };
        record
            .fields
            .insert("module".to_string(), json!(metadata.target()));
        record
    }
}

impl<S, H> tracing_subscriber::Layer<S> for Layer<H>
where
    S: tracing::Subscriber,
    S: for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    H: Fn(LogRecord) + Send + Sync + 'static,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut record = self.record_from_metadata(attrs.metadata());
        record.message = attrs.metadata().name().to_string();
        attrs.record(&mut FieldVisitor(&mut record));

        let span = ctx.span(id).expect("span must exist for on_new_span");
        span.extensions_mut().insert(record);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let span = ctx.span(id).expect("span must exist for on_record");
        let mut extensions = span.extensions_mut();
        if let Some(record) = extensions.get_mut::<LogRecord>() {
            values.record(&mut FieldVisitor(record));
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut record = self.record_from_metadata(event.metadata());
        event.record(&mut FieldVisitor(&mut record));

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(span_record) = extensions.get::<LogRecord>() {
                    record.spans.push(span_record.clone());
                }
            }
        }

        (self.handler)(record)
    }
}

struct FieldVisitor<'a>(&'a mut LogRecord);

impl<'a> FieldVisitor<'a> {
    fn record_raw<V: serde::Serialize>(&mut self, field: &tracing::field::Field, value: V) {
        if field.name() == "message" && self.0.message.is_empty() {
            if let Ok(serde_json::Value::String(s)) = serde_json::to_value(&value) {
                self.0.message = s;
                return;
            }
        }
        match serde_json::to_value(&value) {
            Ok(v) => {
                self.0.fields.insert(field.name().to_string(), v);
            }
            Err(_) => {
                self.0
                    .fields
                    .insert(field.name().to_string(), json!(format!("{}", field.name())));
            }
        }
    }
}

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.record_raw(field, value)
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.record_raw(field, value)
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.record_raw(field, value)
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.record_raw(field, value)
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record_raw(field, value)
    }

    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        // Errors whose Display happens to be JSON are preserved structured
        // rather than double-encoded as a JSON string of a JSON string.
        let parse = |err: &dyn std::error::Error| -> serde_json::Value {
            let text = err.to_string();
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        if value.source().is_none() {
            self.record_raw(field, parse(value));
            return;
        }

        let mut chain = Vec::new();
        let mut next = Some(value);
        while let Some(cur) = next {
            chain.push(parse(cur));
            next = cur.source();
        }
        self.0.fields.insert(field.name().to_string(), json!(chain));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record_raw(field, format!("{value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::prelude::*;

    #[test]
    fn spans_and_events_fold_into_records() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let out_clone = out.clone();

        let _guard = tracing_subscriber::registry()
            .with(Layer::new(move |record| out_clone.lock().unwrap().push(record)))
            .set_default();

        let span = tracing::info_span!("ingest combination", doc_type = "ukpga", year = 2024);
        let _enter = span.enter();
        tracing::warn!(url = "https://example.invalid/ukpga/2024/1", "rate limited");

        drop(_enter);

        let records = out.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "rate limited");
        assert_eq!(records[0].spans.len(), 1);
        assert_eq!(records[0].spans[0].message, "ingest combination");
        assert_eq!(
            records[0].spans[0].fields.get("doc_type"),
            Some(&json!("ukpga"))
        );
    }

    #[test]
    fn error_source_chain_is_captured() {
        let out = Arc::new(Mutex::new(Vec::new()));
        let out_clone = out.clone();

        let _guard = tracing_subscriber::registry()
            .with(Layer::new(move |record| out_clone.lock().unwrap().push(record)))
            .set_default();

        #[derive(Debug)]
        struct Inner;
        impl std::fmt::Display for Inner {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "inner failure")
            }
        }
        impl std::error::Error for Inner {}

        #[derive(Debug)]
        struct Outer(Inner);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "outer failure")
            }
        }
        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err: &(dyn std::error::Error + 'static) = &Outer(Inner);
        tracing::error!(error = err, "upsert failed");

        let records = out.lock().unwrap();
        let chain = records[0].fields.get("error").unwrap().as_array().unwrap();
        assert_eq!(chain.len(), 2);
    }
}
