//! Audit sink implementations

mod recording_sink;
mod tracing_sink;

pub use recording_sink::RecordingAuditSink;
pub use tracing_sink::TracingAuditSink;
