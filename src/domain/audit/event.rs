//! Audit event types and sink trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::flow::RequestType;
use crate::domain::identity::Identity;
use crate::domain::request::{RequestId, RequestStatus};

/// One engine state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    RequestCreated {
        request_id: RequestId,
        request_type: RequestType,
        created_by: Identity,
        step_count: u32,
    },
    StepApproved {
        request_id: RequestId,
        step_number: u32,
        stage: String,
        approver: Identity,
    },
    StepRejected {
        request_id: RequestId,
        step_number: u32,
        stage: String,
        approver: Identity,
    },
    RequestCompleted {
        request_id: RequestId,
        request_type: RequestType,
        status: RequestStatus,
    },
}

impl AuditEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::RequestCreated { request_id, .. }
            | Self::StepApproved { request_id, .. }
            | Self::StepRejected { request_id, .. }
            | Self::RequestCompleted { request_id, .. } => *request_id,
        }
    }
}

/// Consumer of engine audit events.
///
/// Implemented by the external audit/notification collaborator; emission is
/// fire-and-forget from the engine's perspective and must not fail the
/// triggering operation.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    async fn emit(&self, event: AuditEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AuditEvent::RequestCompleted {
            request_id: RequestId::generate(),
            request_type: RequestType::Purchase,
            status: RequestStatus::Approved,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"request_completed\""));
        assert!(json.contains("\"status\":\"approved\""));
    }

    #[test]
    fn test_request_id_accessor() {
        let request_id = RequestId::generate();
        let event = AuditEvent::StepApproved {
            request_id,
            step_number: 1,
            stage: "Financeiro".to_string(),
            approver: Identity::new("carla.lima").unwrap(),
        };

        assert_eq!(event.request_id(), request_id);
    }
}
