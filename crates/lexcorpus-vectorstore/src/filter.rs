use serde_json::Value;

/// The abstract filter tree of §4.7: `field = value`, `field IN set`,
/// `field BETWEEN range`, `field MATCHES value`, and boolean composition.
/// Kept as a plain enum (not a query-builder trait) so it can both be
/// evaluated in-process against a JSON payload (used by tests asserting
/// P3, and as a local short-circuit before an RPC round-trip) and
/// serialized to the wire shape the remote store expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    Between { field: String, min: Option<Value>, max: Option<Value> },
    Matches { field: String, pattern: String },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq { field: field.into(), value: value.into() }
    }

    pub fn in_set(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In { field: field.into(), values }
    }

    pub fn between(field: impl Into<String>, min: Option<Value>, max: Option<Value>) -> Self {
        Filter::Between { field: field.into(), min, max }
    }

    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Matches { field: field.into(), pattern: pattern.into() }
    }

    pub fn and(clauses: Vec<Filter>) -> Option<Filter> {
        match clauses.len() {
            0 => None,
            1 => clauses.into_iter().next(),
            _ => Some(Filter::And(clauses)),
        }
    }

    /// Evaluates this filter tree against a JSON payload. Used both by unit
    /// tests asserting P3 ("filter soundness") and as a defensive
    /// re-validation of scroll/query results before they reach a caller.
    pub fn matches_payload(&self, payload: &Value) -> bool {
        match self {
            Filter::Eq { field, value } => payload.get(field) == Some(value),
            Filter::In { field, values } => payload.get(field).map_or(false, |v| values.contains(v)),
            Filter::Between { field, min, max } => match payload.get(field).and_then(Value::as_f64) {
                Some(v) => {
                    let above_min = min.as_ref().and_then(Value::as_f64).map_or(true, |m| v >= m);
                    let below_max = max.as_ref().and_then(Value::as_f64).map_or(true, |m| v <= m);
                    above_min && below_max
                }
                None => false,
            },
            Filter::Matches { field, pattern } => payload
                .get(field)
                .and_then(Value::as_str)
                .map_or(false, |s| s.contains(pattern.as_str())),
            Filter::And(clauses) => clauses.iter().all(|c| c.matches_payload(payload)),
            Filter::Or(clauses) => clauses.iter().any(|c| c.matches_payload(payload)),
        }
    }

    /// Serializes this filter to the JSON shape sent over the wire to the
    /// remote store's query/scroll RPCs (§6.5).
    pub fn to_wire(&self) -> Value {
        match self {
            Filter::Eq { field, value } => serde_json::json!({"eq": {"field": field, "value": value}}),
            Filter::In { field, values } => serde_json::json!({"in": {"field": field, "values": values}}),
            Filter::Between { field, min, max } => {
                serde_json::json!({"between": {"field": field, "min": min, "max": max}})
            }
            Filter::Matches { field, pattern } => {
                serde_json::json!({"matches": {"field": field, "pattern": pattern}})
            }
            Filter::And(clauses) => serde_json::json!({"and": clauses.iter().map(Filter::to_wire).collect::<Vec<_>>()}),
            Filter::Or(clauses) => serde_json::json!({"or": clauses.iter().map(Filter::to_wire).collect::<Vec<_>>()}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_matches_exact_field_value() {
        let filter = Filter::eq("type", "ukpga");
        assert!(filter.matches_payload(&serde_json::json!({"type": "ukpga"})));
        assert!(!filter.matches_payload(&serde_json::json!({"type": "uksi"})));
    }

    #[test]
    fn in_matches_any_member() {
        let filter = Filter::in_set("type", vec!["ukpga".into(), "uksi".into()]);
        assert!(filter.matches_payload(&serde_json::json!({"type": "uksi"})));
        assert!(!filter.matches_payload(&serde_json::json!({"type": "asp"})));
    }

    #[test]
    fn between_honors_both_bounds() {
        let filter = Filter::between("year", Some(2017.into()), Some(2018.into()));
        assert!(filter.matches_payload(&serde_json::json!({"year": 2017})));
        assert!(filter.matches_payload(&serde_json::json!({"year": 2018})));
        assert!(!filter.matches_payload(&serde_json::json!({"year": 2019})));
    }

    #[test]
    fn between_with_only_lower_bound_is_open_ended() {
        let filter = Filter::between("year", Some(2020.into()), None);
        assert!(filter.matches_payload(&serde_json::json!({"year": 2099})));
        assert!(!filter.matches_payload(&serde_json::json!({"year": 2019})));
    }

    #[test]
    fn and_requires_every_clause() {
        let filter = Filter::And(vec![Filter::eq("type", "ukpga"), Filter::between("year", Some(2017.into()), Some(2018.into()))]);
        assert!(filter.matches_payload(&serde_json::json!({"type": "ukpga", "year": 2018})));
        assert!(!filter.matches_payload(&serde_json::json!({"type": "ukpga", "year": 2020})));
    }

    #[test]
    fn and_of_single_clause_collapses_to_that_clause() {
        let only = Filter::eq("type", "ukpga");
        assert_eq!(Filter::and(vec![only.clone()]), Some(only));
        assert_eq!(Filter::and(vec![]), None);
    }

    #[test]
    fn matches_does_substring_match() {
        let filter = Filter::matches("title", "Companies");
        assert!(filter.matches_payload(&serde_json::json!({"title": "Companies Act 2006"})));
        assert!(!filter.matches_payload(&serde_json::json!({"title": "Finance Act 2006"})));
    }
}
