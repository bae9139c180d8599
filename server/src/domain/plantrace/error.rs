//! Error type for per-record plan conversion

use thiserror::Error;

/// Failure converting a single plan log record.
///
/// Record-level failures are reported and skipped; they never abort the
/// surrounding batch.
#[derive(Debug, Error)]
pub enum PlanTraceError {
    /// Propagation token absent or not decodable into a trace context
    #[error("traceparent missing or malformed: {0}")]
    Traceparent(String),

    /// No JSON object in the message, or the payload does not parse
    #[error("plan payload missing or malformed: {0}")]
    Payload(String),

    /// Plan nesting beyond the configured bound
    #[error("plan tree exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
}
