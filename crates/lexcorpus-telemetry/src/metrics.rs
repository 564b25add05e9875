use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// The ambient metrics facade referenced by §4.12 and §1 ("telemetry
/// exporters" are excluded; this trait and its in-memory test double are
/// not — they're how the rest of the core *records* its counters, the wire
/// format is the external adapter's job).
pub trait MetricSink: Send + Sync {
    fn increment_counter(&self, name: &str, value: u64);
    fn observe_duration(&self, name: &str, duration: Duration);

    fn document_ingested(&self, doc_type: &str) {
        self.increment_counter(&format!("documents_ingested.{doc_type}"), 1);
    }

    fn section_upserted(&self) {
        self.increment_counter("sections_upserted", 1);
    }

    fn rate_limit_event(&self) {
        self.increment_counter("rate_limit_events", 1);
    }
}

/// Discards every observation. The default for production callers that
/// haven't wired in a real sink yet.
pub struct NoopMetricSink;

impl MetricSink for NoopMetricSink {
    fn increment_counter(&self, _name: &str, _value: u64) {}
    fn observe_duration(&self, _name: &str, _duration: Duration) {}
}

/// Accumulates counters and duration samples in memory. Used by tests across
/// the workspace to assert on emitted metrics without standing up a real
/// exporter.
#[derive(Default)]
pub struct InMemoryMetricSink {
    counters: Mutex<BTreeMap<String, u64>>,
    durations: Mutex<BTreeMap<String, Vec<Duration>>>,
}

impl InMemoryMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn durations(&self, name: &str) -> Vec<Duration> {
        self.durations
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

impl MetricSink for InMemoryMetricSink {
    fn increment_counter(&self, name: &str, value: u64) {
        *self.counters.lock().unwrap().entry(name.to_string()).or_insert(0) += value;
    }

    fn observe_duration(&self, name: &str, duration: Duration) {
        self.durations
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let sink = InMemoryMetricSink::new();
        sink.document_ingested("ukpga");
        sink.document_ingested("ukpga");
        sink.rate_limit_event();
        assert_eq!(sink.counter("documents_ingested.ukpga"), 2);
        assert_eq!(sink.counter("rate_limit_events"), 1);
    }
}
