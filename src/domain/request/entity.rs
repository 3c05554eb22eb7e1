//! Approval request and step ledger entities

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::directory::AreaName;
use crate::domain::error::EngineError;
use crate::domain::flow::{FlowConfig, RequestType, StageRef};
use crate::domain::identity::Identity;

/// Unique identifier of an approval request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random request ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of an approval step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(Uuid);

impl StepId {
    /// Generate a new random step ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the domain entity a request is about (provider, purchase
/// payload, ...). The referenced entity is owned by an external collaborator;
/// the engine only carries the reference through to side-effect handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    entity_type: String,
    entity_id: String,
}

impl SubjectRef {
    /// Create a subject reference
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let entity_type = entity_type.into();
        let entity_id = entity_id.into();

        if entity_type.trim().is_empty() {
            return Err(EngineError::validation("Subject entity type cannot be empty"));
        }
        if entity_id.trim().is_empty() {
            return Err(EngineError::validation("Subject entity id cannot be empty"));
        }

        Ok(Self {
            entity_type,
            entity_id,
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.entity_id)
    }
}

/// Overall status of an approval request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting on one or more approval steps
    #[default]
    Pending,
    /// Every step approved; terminal
    Approved,
    /// Rejected at some step; terminal
    Rejected,
}

impl RequestStatus {
    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Status of a single approval step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet decided
    #[default]
    Pending,
    /// Approved; terminal
    Approved,
    /// Rejected; terminal
    Rejected,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One workflow instance: a request that must pass its flow's approval chain.
///
/// Owned exclusively by the workflow engine after creation; the subject
/// entity itself belongs to the external collaborator that asked for the
/// workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    id: RequestId,
    request_type: RequestType,
    created_by: Identity,
    /// Requester's organizational area, captured at creation; every approver
    /// resolution for this request uses it as context
    requester_area: AreaName,
    subject: SubjectRef,
    status: RequestStatus,
    current_step_number: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Create a new pending request positioned at step 1
    pub fn new(
        request_type: RequestType,
        subject: SubjectRef,
        created_by: Identity,
        requester_area: AreaName,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::generate(),
            request_type,
            created_by,
            requester_area,
            subject,
            status: RequestStatus::Pending,
            current_step_number: 1,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn created_by(&self) -> &Identity {
        &self.created_by
    }

    pub fn requester_area(&self) -> &AreaName {
        &self.requester_area
    }

    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn current_step_number(&self) -> u32 {
        self.current_step_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // Mutators, used only by ledger implementations

    pub(crate) fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_current_step_number(&mut self, step_number: u32) {
        self.current_step_number = step_number;
        self.updated_at = Utc::now();
    }
}

/// A materialized stage within one request's ledger.
///
/// Steps are created in bulk at request creation, mutated exactly once by an
/// approve/reject decision, and never deleted: the ledger is an audit trail,
/// not a compacted work queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalStep {
    id: StepId,
    request_id: RequestId,
    /// 1-based position, contiguous within the parent request
    step_number: u32,
    stage: StageRef,
    status: StepStatus,
    /// Identity that decided the step; None until acted on
    #[serde(skip_serializing_if = "Option::is_none")]
    approver: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decided_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl ApprovalStep {
    /// Create a pending step for a stage
    pub fn new(request_id: RequestId, step_number: u32, stage: StageRef) -> Self {
        Self {
            id: StepId::generate(),
            request_id,
            step_number,
            stage,
            status: StepStatus::Pending,
            approver: None,
            decided_at: None,
            comment: None,
        }
    }

    /// Materialize the full ledger for a request from its flow configuration
    pub fn materialize(request_id: RequestId, flow: &FlowConfig) -> Vec<Self> {
        flow.stages()
            .iter()
            .enumerate()
            .map(|(index, stage)| Self::new(request_id, index as u32 + 1, stage.clone()))
            .collect()
    }

    // Getters

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    pub fn stage(&self) -> &StageRef {
        &self.stage
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn approver(&self) -> Option<&Identity> {
        self.approver.as_ref()
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    // Mutator, used only by ledger implementations

    pub(crate) fn record_decision(&mut self, decision: &StepDecision) {
        self.status = decision.status;
        self.approver = Some(decision.approver.clone());
        self.decided_at = Some(decision.decided_at);
        self.comment = decision.comment.clone();
    }
}

/// The outcome an approver records on a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepDecision {
    pub status: StepStatus,
    pub approver: Identity,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl StepDecision {
    pub fn approved(approver: Identity, comment: Option<String>) -> Self {
        Self {
            status: StepStatus::Approved,
            approver,
            comment,
            decided_at: Utc::now(),
        }
    }

    pub fn rejected(approver: Identity, comment: String) -> Self {
        Self {
            status: StepStatus::Rejected,
            approver,
            comment: Some(comment),
            decided_at: Utc::now(),
        }
    }
}

/// The lowest-numbered non-terminal step of a ledger, if any.
///
/// Actionability is derived, never stored: only this step may be acted on,
/// and only while the parent request is pending.
pub fn current_actionable_step(steps: &[ApprovalStep]) -> Option<&ApprovalStep> {
    steps
        .iter()
        .filter(|step| !step.status().is_terminal())
        .min_by_key(|step| step.step_number())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ApprovalRequest {
        ApprovalRequest::new(
            RequestType::Purchase,
            SubjectRef::new("purchase", "po-1001").unwrap(),
            Identity::new("maria.souza").unwrap(),
            AreaName::new("Engenharia").unwrap(),
        )
    }

    #[test]
    fn test_new_request_starts_pending_at_step_one() {
        let request = sample_request();
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.current_step_number(), 1);
        assert!(!request.is_terminal());
        assert_eq!(request.subject().entity_type(), "purchase");
    }

    #[test]
    fn test_subject_ref_validation() {
        assert!(SubjectRef::new("", "id").is_err());
        assert!(SubjectRef::new("provider", "  ").is_err());
        assert!(SubjectRef::new("provider", "prov-42").is_ok());
    }

    #[test]
    fn test_subject_ref_display() {
        let subject = SubjectRef::new("provider", "prov-42").unwrap();
        assert_eq!(subject.to_string(), "provider/prov-42");
    }

    #[test]
    fn test_status_terminality() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());

        assert!(!StepStatus::Pending.is_terminal());
        assert!(StepStatus::Approved.is_terminal());
        assert!(StepStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_materialize_steps_from_flow() {
        let request = sample_request();
        let flow = FlowConfig::default_for(RequestType::Purchase);

        let steps = ApprovalStep::materialize(request.id(), &flow);

        assert_eq!(steps.len(), flow.stage_count());
        for (index, step) in steps.iter().enumerate() {
            assert_eq!(step.step_number(), index as u32 + 1);
            assert_eq!(step.status(), StepStatus::Pending);
            assert_eq!(step.request_id(), request.id());
            assert!(step.approver().is_none());
        }
        assert_eq!(steps[0].stage(), &StageRef::RequesterArea);
        assert_eq!(steps[1].stage().name(), "Financeiro");
    }

    #[test]
    fn test_current_actionable_step_is_lowest_pending() {
        let request = sample_request();
        let flow = FlowConfig::default_for(RequestType::Termination);
        let mut steps = ApprovalStep::materialize(request.id(), &flow);

        assert_eq!(current_actionable_step(&steps).unwrap().step_number(), 1);

        let decision =
            StepDecision::approved(Identity::new("diretor").unwrap(), Some("ok".to_string()));
        steps[0].record_decision(&decision);

        assert_eq!(current_actionable_step(&steps).unwrap().step_number(), 2);

        // At most one actionable step at any time
        let pending: Vec<_> = steps
            .iter()
            .filter(|s| !s.status().is_terminal())
            .collect();
        let actionable = current_actionable_step(&steps).unwrap();
        assert!(pending
            .iter()
            .all(|s| s.step_number() >= actionable.step_number()));
    }

    #[test]
    fn test_current_actionable_step_none_when_all_decided() {
        let request = sample_request();
        let flow = FlowConfig::default_for(RequestType::Purchase);
        let mut steps = ApprovalStep::materialize(request.id(), &flow);

        let approver = Identity::new("aprovador").unwrap();
        for step in &mut steps {
            step.record_decision(&StepDecision::approved(approver.clone(), None));
        }

        assert!(current_actionable_step(&steps).is_none());
    }

    #[test]
    fn test_record_decision_stamps_approver_and_time() {
        let request = sample_request();
        let mut step = ApprovalStep::new(request.id(), 1, StageRef::RequesterArea);

        let approver = Identity::new("diretor").unwrap();
        step.record_decision(&StepDecision::rejected(
            approver.clone(),
            "motivo x".to_string(),
        ));

        assert_eq!(step.status(), StepStatus::Rejected);
        assert_eq!(step.approver(), Some(&approver));
        assert_eq!(step.comment(), Some("motivo x"));
        assert!(step.decided_at().is_some());
    }

    #[test]
    fn test_request_serialization() {
        let request = sample_request();
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"status\":\"pending\""));

        let deserialized: ApprovalRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, request);
    }
}
