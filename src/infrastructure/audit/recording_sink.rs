//! Audit sink that records events in memory

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{AuditEvent, AuditSink};

/// Records emitted events for later inspection; used by tests and local
/// tooling that needs to assert on the transition stream.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn emit(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
