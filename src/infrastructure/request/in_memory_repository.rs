//! In-memory approval ledger
//!
//! All conditional updates run under a single write lock, giving the same
//! "update ... where status = pending" semantics a relational backend
//! provides with status-guarded conditional updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    ApprovalLedger, ApprovalRequest, ApprovalStep, EngineError, RequestId, RequestStatus,
    RequestTransition, StepDecision, StepId, StepStatus,
};

#[derive(Debug, Default)]
struct LedgerState {
    requests: HashMap<RequestId, ApprovalRequest>,
    /// Steps per request, kept sorted by step number
    steps: HashMap<RequestId, Vec<ApprovalStep>>,
    step_index: HashMap<StepId, RequestId>,
}

/// In-memory implementation of ApprovalLedger
#[derive(Debug)]
pub struct InMemoryApprovalLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryApprovalLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }
}

impl Default for InMemoryApprovalLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalLedger for InMemoryApprovalLedger {
    async fn create(
        &self,
        request: ApprovalRequest,
        steps: Vec<ApprovalStep>,
    ) -> Result<ApprovalRequest, EngineError> {
        if steps.is_empty() {
            return Err(EngineError::validation(
                "Request must be created with at least one step",
            ));
        }

        for (index, step) in steps.iter().enumerate() {
            if step.request_id() != request.id() {
                return Err(EngineError::validation(format!(
                    "Step {} belongs to another request",
                    step.id()
                )));
            }
            if step.step_number() != index as u32 + 1 {
                return Err(EngineError::validation(format!(
                    "Step numbers must be contiguous from 1, got {} at position {}",
                    step.step_number(),
                    index
                )));
            }
        }

        let mut state = self.state.write().await;

        if state.requests.contains_key(&request.id()) {
            return Err(EngineError::storage(format!(
                "Request '{}' already exists",
                request.id()
            )));
        }

        for step in &steps {
            state.step_index.insert(step.id(), request.id());
        }
        state.steps.insert(request.id(), steps);
        state.requests.insert(request.id(), request.clone());

        Ok(request)
    }

    async fn get_request(&self, id: RequestId) -> Result<Option<ApprovalRequest>, EngineError> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn list_requests(&self) -> Result<Vec<ApprovalRequest>, EngineError> {
        let state = self.state.read().await;
        Ok(state.requests.values().cloned().collect())
    }

    async fn steps(&self, request_id: RequestId) -> Result<Vec<ApprovalStep>, EngineError> {
        let state = self.state.read().await;
        Ok(state.steps.get(&request_id).cloned().unwrap_or_default())
    }

    async fn get_step(&self, step_id: StepId) -> Result<Option<ApprovalStep>, EngineError> {
        let state = self.state.read().await;
        let Some(request_id) = state.step_index.get(&step_id) else {
            return Ok(None);
        };
        Ok(state
            .steps
            .get(request_id)
            .and_then(|steps| steps.iter().find(|s| s.id() == step_id).cloned()))
    }

    async fn decide_step(
        &self,
        step_id: StepId,
        decision: StepDecision,
        transition: RequestTransition,
    ) -> Result<bool, EngineError> {
        if decision.status == StepStatus::Pending {
            return Err(EngineError::validation(
                "A decision must move the step to a terminal status",
            ));
        }
        if let RequestTransition::Complete(status) = transition {
            if !status.is_terminal() {
                return Err(EngineError::validation(
                    "Completion status must be terminal",
                ));
            }
        }

        let mut state = self.state.write().await;
        let Some(request_id) = state.step_index.get(&step_id).copied() else {
            return Err(EngineError::not_found(format!("Step '{}' not found", step_id)));
        };

        // Both guards are read before either mutation: the decision and the
        // request transition commit together or not at all.
        let request = state
            .requests
            .get(&request_id)
            .ok_or_else(|| EngineError::storage("step index out of sync with ledger"))?;
        let steps = state
            .steps
            .get(&request_id)
            .ok_or_else(|| EngineError::storage("step index out of sync with ledger"))?;
        let step_count = steps.len();
        let step_number = steps
            .iter()
            .find(|s| s.id() == step_id)
            .ok_or_else(|| EngineError::storage("step index out of sync with ledger"))?
            .step_number();

        if request.status() != RequestStatus::Pending
            || request.current_step_number() != step_number
        {
            return Ok(false);
        }

        if transition == RequestTransition::Advance && step_number as usize >= step_count {
            return Err(EngineError::validation(
                "Cannot advance past the final step",
            ));
        }

        let step = state
            .steps
            .get_mut(&request_id)
            .and_then(|steps| steps.iter_mut().find(|s| s.id() == step_id))
            .ok_or_else(|| EngineError::storage("step index out of sync with ledger"))?;

        if step.status() != StepStatus::Pending {
            return Ok(false);
        }
        step.record_decision(&decision);

        let request = state
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| EngineError::storage("step index out of sync with ledger"))?;
        match transition {
            RequestTransition::Advance => request.set_current_step_number(step_number + 1),
            RequestTransition::Complete(status) => request.set_status(status),
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AreaName, FlowConfig, Identity, RequestType, StageRef, SubjectRef};

    fn sample_request() -> (ApprovalRequest, Vec<ApprovalStep>) {
        let request = ApprovalRequest::new(
            RequestType::Purchase,
            SubjectRef::new("purchase", "po-1001").unwrap(),
            Identity::new("maria.souza").unwrap(),
            AreaName::new("Engenharia").unwrap(),
        );
        let steps =
            ApprovalStep::materialize(request.id(), &FlowConfig::default_for(RequestType::Purchase));
        (request, steps)
    }

    fn three_step_request() -> (ApprovalRequest, Vec<ApprovalStep>) {
        let request = ApprovalRequest::new(
            RequestType::Termination,
            SubjectRef::new("provider", "prov-42").unwrap(),
            Identity::new("maria.souza").unwrap(),
            AreaName::new("Engenharia").unwrap(),
        );
        let steps = ApprovalStep::materialize(
            request.id(),
            &FlowConfig::default_for(RequestType::Termination),
        );
        (request, steps)
    }

    fn approval(identity: &str) -> StepDecision {
        StepDecision::approved(Identity::new(identity).unwrap(), Some("ok".to_string()))
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        let step_count = steps.len();

        ledger.create(request.clone(), steps).await.unwrap();

        let stored = ledger.get_request(request.id()).await.unwrap().unwrap();
        assert_eq!(stored, request);

        let stored_steps = ledger.steps(request.id()).await.unwrap();
        assert_eq!(stored_steps.len(), step_count);
        assert_eq!(stored_steps[0].step_number(), 1);

        let by_id = ledger.get_step(stored_steps[1].id()).await.unwrap();
        assert_eq!(by_id.unwrap().step_number(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_gapped_step_numbers() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, _) = sample_request();

        let steps = vec![
            ApprovalStep::new(request.id(), 1, StageRef::RequesterArea),
            ApprovalStep::new(request.id(), 3, StageRef::area("Financeiro").unwrap()),
        ];

        let result = ledger.create(request, steps).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("contiguous"));
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();

        ledger.create(request.clone(), steps.clone()).await.unwrap();
        let result = ledger.create(request, steps).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_decide_step_advances_request_atomically() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        let id = request.id();
        let first = steps[0].id();
        ledger.create(request, steps).await.unwrap();

        assert!(ledger
            .decide_step(first, approval("diretor"), RequestTransition::Advance)
            .await
            .unwrap());

        let step = ledger.get_step(first).await.unwrap().unwrap();
        assert_eq!(step.status(), StepStatus::Approved);
        assert_eq!(step.approver().unwrap().as_str(), "diretor");

        let stored = ledger.get_request(id).await.unwrap().unwrap();
        assert_eq!(stored.current_step_number(), 2);
        assert_eq!(stored.status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_decide_step_guards_on_pending_step() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = three_step_request();
        let first = steps[0].id();
        ledger.create(request.clone(), steps).await.unwrap();

        assert!(ledger
            .decide_step(first, approval("diretor"), RequestTransition::Advance)
            .await
            .unwrap());

        // A second decision on the same step observes the guard failing;
        // the request pointer is untouched by the losing call
        assert!(!ledger
            .decide_step(first, approval("outro"), RequestTransition::Advance)
            .await
            .unwrap());

        let step = ledger.get_step(first).await.unwrap().unwrap();
        assert_eq!(step.approver().unwrap().as_str(), "diretor");
        let stored = ledger.get_request(request.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_step_number(), 2);
    }

    #[tokio::test]
    async fn test_decide_step_guards_on_request_position() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = three_step_request();
        let id = request.id();
        let second = steps[1].id();
        ledger.create(request, steps).await.unwrap();

        // The request is positioned at step 1; a decision on step 2 must not
        // commit anything, not even the step decision itself
        assert!(!ledger
            .decide_step(second, approval("rh.diretor"), RequestTransition::Advance)
            .await
            .unwrap());

        let step = ledger.get_step(second).await.unwrap().unwrap();
        assert_eq!(step.status(), StepStatus::Pending);
        assert!(step.approver().is_none());

        let stored = ledger.get_request(id).await.unwrap().unwrap();
        assert_eq!(stored.current_step_number(), 1);
        assert_eq!(stored.status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_decide_step_guards_on_terminal_request() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        let first = steps[0].id();
        ledger.create(request, steps).await.unwrap();

        assert!(ledger
            .decide_step(
                first,
                StepDecision::rejected(
                    Identity::new("diretor").unwrap(),
                    "sem verba".to_string(),
                ),
                RequestTransition::Complete(RequestStatus::Rejected),
            )
            .await
            .unwrap());

        // Terminal request: no further decision commits
        assert!(!ledger
            .decide_step(first, approval("outro"), RequestTransition::Advance)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_decide_step_completes_request() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        let id = request.id();
        ledger.create(request, steps.clone()).await.unwrap();

        assert!(ledger
            .decide_step(steps[0].id(), approval("diretor"), RequestTransition::Advance)
            .await
            .unwrap());
        assert!(ledger
            .decide_step(
                steps[1].id(),
                approval("carla.lima"),
                RequestTransition::Complete(RequestStatus::Approved),
            )
            .await
            .unwrap());

        let stored = ledger.get_request(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_decide_unknown_step_is_not_found() {
        let ledger = InMemoryApprovalLedger::new();
        let result = ledger
            .decide_step(
                StepId::generate(),
                approval("diretor"),
                RequestTransition::Advance,
            )
            .await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_decide_step_rejects_advance_past_final_step() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        let id = request.id();
        ledger.create(request, steps.clone()).await.unwrap();

        ledger
            .decide_step(steps[0].id(), approval("diretor"), RequestTransition::Advance)
            .await
            .unwrap();

        let result = ledger
            .decide_step(steps[1].id(), approval("carla.lima"), RequestTransition::Advance)
            .await;
        assert!(result.is_err());

        // The failed call left the final step untouched
        let step = ledger.get_step(steps[1].id()).await.unwrap().unwrap();
        assert_eq!(step.status(), StepStatus::Pending);
        let stored = ledger.get_request(id).await.unwrap().unwrap();
        assert_eq!(stored.current_step_number(), 2);
    }

    #[tokio::test]
    async fn test_decide_step_rejects_non_terminal_completion() {
        let ledger = InMemoryApprovalLedger::new();
        let (request, steps) = sample_request();
        ledger.create(request, steps.clone()).await.unwrap();

        let result = ledger
            .decide_step(
                steps[0].id(),
                approval("diretor"),
                RequestTransition::Complete(RequestStatus::Pending),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_decides_exactly_one_wins() {
        let ledger = Arc::new(InMemoryApprovalLedger::new());
        let (request, steps) = sample_request();
        let first = steps[0].id();
        ledger.create(request, steps).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .decide_step(
                            first,
                            approval(&format!("approver-{}", i)),
                            RequestTransition::Advance,
                        )
                        .await
                })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_distinct_requests_are_independent() {
        let ledger = InMemoryApprovalLedger::new();
        let (first, first_steps) = sample_request();
        let (second, second_steps) = sample_request();
        let first_step = first_steps[0].id();

        ledger.create(first.clone(), first_steps).await.unwrap();
        ledger.create(second.clone(), second_steps).await.unwrap();

        ledger
            .decide_step(
                first_step,
                StepDecision::rejected(
                    Identity::new("diretor").unwrap(),
                    "sem verba".to_string(),
                ),
                RequestTransition::Complete(RequestStatus::Rejected),
            )
            .await
            .unwrap();

        let other = ledger.get_request(second.id()).await.unwrap().unwrap();
        assert_eq!(other.status(), RequestStatus::Pending);

        assert_eq!(ledger.list_requests().await.unwrap().len(), 2);
    }
}
