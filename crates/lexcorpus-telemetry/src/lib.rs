//! The ambient logging/metrics stack (C12) shared by every lexcorpus crate.
//! No business decisions depend on anything in this crate.

mod layer;
mod log_record;
mod metrics;

pub use layer::Layer;
pub use log_record::{Level, LogRecord};
pub use metrics::{InMemoryMetricSink, MetricSink, NoopMetricSink};

/// Installs [`Layer`] as the global default subscriber, filtered by
/// `RUST_LOG`/`LEXCORPUS_LOG` (whichever is set). Intended for use by the
/// external CLI/HTTP adapters (§1); library crates never call this
/// themselves, they only emit `tracing` spans/events.
pub fn install_global<H>(handler: H)
where
    H: Fn(LogRecord) + Send + Sync + 'static,
{
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_env("LEXCORPUS_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(Layer::new(handler).with_filter(env_filter));
    let _ = tracing::subscriber::set_global_default(subscriber);
}
