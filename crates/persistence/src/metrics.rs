//! Statement timing metrics.
//!
//! Records against the `metrics` facade; wiring an exporter is the embedding
//! application's choice.

use metrics::histogram;
use std::time::Instant;

/// Records one delegated statement's duration.
pub fn record_statement_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "orm_statement_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Times a delegated statement and records it on completion.
///
/// Usage:
/// ```ignore
/// let timer = StatementTimer::new("find");
/// let result = engine.find(entity, id, lock);
/// timer.record();
/// ```
pub struct StatementTimer {
    operation: String,
    start: Instant,
}

impl StatementTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    /// Records the elapsed duration and returns it in seconds.
    pub fn record(self) -> f64 {
        let duration_secs = self.start.elapsed().as_secs_f64();
        record_statement_duration(&self.operation, duration_secs);
        duration_secs
    }
}
