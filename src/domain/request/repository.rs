//! Approval ledger trait

use async_trait::async_trait;

use super::entity::{ApprovalRequest, ApprovalStep, RequestId, RequestStatus, StepDecision, StepId};
use crate::domain::error::EngineError;

/// How the parent request transitions when a step decision commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransition {
    /// Move the request to the next step
    Advance,
    /// Move the request to a terminal status
    Complete(RequestStatus),
}

/// Durable storage for approval requests and their step ledgers.
///
/// `decide_step` is a status-guarded conditional update covering both the
/// step and its parent request in one critical section: it returns
/// `Ok(false)` when the guard no longer holds (another actor got there
/// first), and a failed call leaves the ledger untouched. Reads are
/// lock-free and stale-tolerant.
#[async_trait]
pub trait ApprovalLedger: Send + Sync + std::fmt::Debug {
    /// Persist a new request together with its full step ledger
    async fn create(
        &self,
        request: ApprovalRequest,
        steps: Vec<ApprovalStep>,
    ) -> Result<ApprovalRequest, EngineError>;

    /// Get a request by ID
    async fn get_request(&self, id: RequestId) -> Result<Option<ApprovalRequest>, EngineError>;

    /// List all requests
    async fn list_requests(&self) -> Result<Vec<ApprovalRequest>, EngineError>;

    /// All steps of a request, ordered by step number
    async fn steps(&self, request_id: RequestId) -> Result<Vec<ApprovalStep>, EngineError>;

    /// Get a single step by ID
    async fn get_step(&self, step_id: StepId) -> Result<Option<ApprovalStep>, EngineError>;

    /// Record a decision on a step and apply the request transition as one
    /// guarded operation, conditional on the step being pending, its parent
    /// request being pending, and the step being the request's current one.
    /// `Ok(false)` means the guard failed (race lost) and nothing changed.
    async fn decide_step(
        &self,
        step_id: StepId,
        decision: StepDecision,
        transition: RequestTransition,
    ) -> Result<bool, EngineError>;
}
