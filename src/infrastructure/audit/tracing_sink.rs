//! Audit sink that logs structured tracing events

use async_trait::async_trait;
use tracing::info;

use crate::domain::{AuditEvent, AuditSink};

/// Emits every engine state transition as a structured log event
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn emit(&self, event: AuditEvent) {
        match &event {
            AuditEvent::RequestCreated {
                request_id,
                request_type,
                created_by,
                step_count,
            } => info!(
                %request_id,
                %request_type,
                %created_by,
                step_count,
                "approval request created"
            ),
            AuditEvent::StepApproved {
                request_id,
                step_number,
                stage,
                approver,
            } => info!(%request_id, step_number, stage, %approver, "step approved"),
            AuditEvent::StepRejected {
                request_id,
                step_number,
                stage,
                approver,
            } => info!(%request_id, step_number, stage, %approver, "step rejected"),
            AuditEvent::RequestCompleted {
                request_id,
                request_type,
                status,
            } => info!(
                %request_id,
                %request_type,
                status = ?status,
                "approval request completed"
            ),
        }
    }
}
