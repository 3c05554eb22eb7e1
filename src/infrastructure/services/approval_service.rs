//! Approval service - the workflow engine
//!
//! Orchestrates step materialization at request creation, validates and
//! applies approve/reject transitions with strict left-to-right progression,
//! and triggers completion side effects.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::{DisabledFlowPolicy, EngineConfig};
use crate::domain::{
    current_actionable_step, Actor, ApprovalLedger, ApprovalRequest, ApprovalStep,
    ApproverResolver, AreaName, AuditEvent, AuditSink, EngineError, Identity, RequestContext,
    RequestId, RequestStatus, RequestTransition, RequestType, SideEffectDispatcher, StepDecision,
    StepId, SubjectRef,
};

use super::flow_service::FlowService;

/// Result of an approve call
#[derive(Debug, Clone, PartialEq)]
pub struct ApproveOutcome {
    /// True when this approval completed the whole chain
    pub is_fully_approved: bool,

    /// Display name of the next stage, when the chain continues
    pub next_stage: Option<String>,

    /// Failure of the terminal side effect, reported alongside the committed
    /// approval; the approval itself is never rolled back.
    pub side_effect_error: Option<EngineError>,
}

/// Result of a can-act check
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCheck {
    /// Whether the actor may decide the current step
    pub actionable: bool,

    /// The current actionable step, if the request is still in flight
    pub step: Option<ApprovalStep>,

    /// Identities resolved as approvers for the current step
    pub approvers: HashSet<Identity>,

    /// True when the actor may act only through the admin override
    pub is_admin_override: bool,
}

impl ActionCheck {
    fn not_actionable(step: Option<ApprovalStep>) -> Self {
        Self {
            actionable: false,
            step,
            approvers: HashSet::new(),
            is_admin_override: false,
        }
    }
}

/// How an authorized actor is allowed to act on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Approve,
    Reject,
}

/// The workflow engine.
///
/// Owns every mutation of approval requests and their step ledgers. All
/// operations are short, synchronous units of work; concurrency control is
/// optimistic through the ledger's status-guarded conditional updates.
pub struct ApprovalService {
    ledger: Arc<dyn ApprovalLedger>,
    flows: Arc<FlowService>,
    resolver: ApproverResolver,
    dispatcher: SideEffectDispatcher,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
}

impl std::fmt::Debug for ApprovalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalService").finish()
    }
}

impl ApprovalService {
    pub fn new(
        ledger: Arc<dyn ApprovalLedger>,
        flows: Arc<FlowService>,
        resolver: ApproverResolver,
        dispatcher: SideEffectDispatcher,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger,
            flows,
            resolver,
            dispatcher,
            audit,
            config,
        }
    }

    /// Create a new approval request, materializing its full step ledger
    /// from the effective flow configuration.
    pub async fn create_request(
        &self,
        request_type: RequestType,
        subject: SubjectRef,
        requester_area: AreaName,
        creator: &Actor,
    ) -> Result<ApprovalRequest, EngineError> {
        let flow = self.flows.get_flow(request_type).await?;
        if !flow.is_enabled() {
            return Err(EngineError::flow_disabled(request_type));
        }

        let request = ApprovalRequest::new(
            request_type,
            subject,
            creator.identity().clone(),
            requester_area,
        );
        let steps = ApprovalStep::materialize(request.id(), &flow);
        let step_count = steps.len() as u32;

        let request = self.ledger.create(request, steps).await?;

        info!(
            request_id = %request.id(),
            %request_type,
            created_by = %creator.identity(),
            step_count,
            "approval request created"
        );
        self.audit
            .emit(AuditEvent::RequestCreated {
                request_id: request.id(),
                request_type,
                created_by: creator.identity().clone(),
                step_count,
            })
            .await;

        Ok(request)
    }

    /// Get a request by ID
    pub async fn get_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<ApprovalRequest>, EngineError> {
        self.ledger.get_request(request_id).await
    }

    /// List all requests
    pub async fn list_requests(&self) -> Result<Vec<ApprovalRequest>, EngineError> {
        self.ledger.list_requests().await
    }

    /// The full step ledger of a request, ordered by step number
    pub async fn steps(&self, request_id: RequestId) -> Result<Vec<ApprovalStep>, EngineError> {
        self.ledger.steps(request_id).await
    }

    /// Whether an actor may decide the current step of a request.
    ///
    /// Lock-free read over possibly stale state; the authoritative check is
    /// repeated inside approve/reject.
    pub async fn can_act(
        &self,
        request_id: RequestId,
        actor: &Actor,
    ) -> Result<ActionCheck, EngineError> {
        let request = self.require_request(request_id).await?;

        if request.is_terminal() {
            return Ok(ActionCheck::not_actionable(None));
        }

        let steps = self.ledger.steps(request_id).await?;
        let Some(current) = current_actionable_step(&steps).cloned() else {
            return Ok(ActionCheck::not_actionable(None));
        };

        if self.is_frozen(request.request_type()).await? {
            return Ok(ActionCheck::not_actionable(Some(current)));
        }

        let ctx = RequestContext::new(request.requester_area().clone());
        let resolved = self.resolver.resolve(current.stage(), &ctx).await?;

        let is_member = resolved.approver_ids.contains(actor.identity());
        let actionable = is_member || actor.is_admin();

        Ok(ActionCheck {
            actionable,
            step: Some(current),
            approvers: resolved.approver_ids,
            is_admin_override: actionable && !is_member,
        })
    }

    /// Approve the current actionable step of a request.
    ///
    /// When the approved step is the last one, the request is marked
    /// approved and the terminal side effect runs synchronously before this
    /// returns; a side-effect failure is reported in the outcome without
    /// rolling back the approval.
    pub async fn approve(
        &self,
        step_id: StepId,
        actor: &Actor,
        comment: Option<String>,
    ) -> Result<ApproveOutcome, EngineError> {
        let (request, steps, step) = self.load_for_decision(step_id).await?;
        self.authorize(&request, &steps, &step, actor, Action::Approve)
            .await?;

        let is_last = step.step_number() as usize == steps.len();
        let transition = if is_last {
            RequestTransition::Complete(RequestStatus::Approved)
        } else {
            RequestTransition::Advance
        };

        let decision = StepDecision::approved(actor.identity().clone(), comment);
        if !self.ledger.decide_step(step_id, decision, transition).await? {
            // Lost the race: someone decided this step first
            return Err(EngineError::invalid_state(format!(
                "Step {} of request {} is no longer pending",
                step.step_number(),
                request.id()
            )));
        }

        let stage_name = step.stage().display_name(request.requester_area());
        info!(
            request_id = %request.id(),
            step_number = step.step_number(),
            stage = %stage_name,
            approver = %actor.identity(),
            "step approved"
        );
        self.audit
            .emit(AuditEvent::StepApproved {
                request_id: request.id(),
                step_number: step.step_number(),
                stage: stage_name,
                approver: actor.identity().clone(),
            })
            .await;

        if is_last {
            return Ok(self.finish_approved(&request).await);
        }

        let next_stage = steps[step.step_number() as usize]
            .stage()
            .display_name(request.requester_area());

        Ok(ApproveOutcome {
            is_fully_approved: false,
            next_stage: Some(next_stage),
            side_effect_error: None,
        })
    }

    /// Reject the current actionable step, terminating the whole request.
    ///
    /// Other steps keep their prior status: the ledger is an audit trail and
    /// is never retroactively edited.
    pub async fn reject(
        &self,
        step_id: StepId,
        actor: &Actor,
        comment: impl Into<String>,
    ) -> Result<(), EngineError> {
        let comment = comment.into();
        if comment.chars().count() < self.config.min_reject_comment_chars {
            return Err(EngineError::validation(format!(
                "Rejection comment must have at least {} characters",
                self.config.min_reject_comment_chars
            )));
        }

        let (request, steps, step) = self.load_for_decision(step_id).await?;
        self.authorize(&request, &steps, &step, actor, Action::Reject)
            .await?;

        let decision = StepDecision::rejected(actor.identity().clone(), comment);
        if !self
            .ledger
            .decide_step(
                step_id,
                decision,
                RequestTransition::Complete(RequestStatus::Rejected),
            )
            .await?
        {
            return Err(EngineError::invalid_state(format!(
                "Step {} of request {} is no longer pending",
                step.step_number(),
                request.id()
            )));
        }

        let stage_name = step.stage().display_name(request.requester_area());
        info!(
            request_id = %request.id(),
            step_number = step.step_number(),
            stage = %stage_name,
            approver = %actor.identity(),
            "step rejected, request terminated"
        );
        self.audit
            .emit(AuditEvent::StepRejected {
                request_id: request.id(),
                step_number: step.step_number(),
                stage: stage_name,
                approver: actor.identity().clone(),
            })
            .await;
        self.audit
            .emit(AuditEvent::RequestCompleted {
                request_id: request.id(),
                request_type: request.request_type(),
                status: RequestStatus::Rejected,
            })
            .await;

        Ok(())
    }

    /// Bookkeeping after the final approval has committed: audit event plus
    /// the exactly-once terminal side effect.
    async fn finish_approved(&self, request: &ApprovalRequest) -> ApproveOutcome {
        info!(request_id = %request.id(), "request fully approved");
        self.audit
            .emit(AuditEvent::RequestCompleted {
                request_id: request.id(),
                request_type: request.request_type(),
                status: RequestStatus::Approved,
            })
            .await;

        // Full approval is durable at this point; the terminal action runs
        // exactly once and its failure is reported, not rolled back.
        let side_effect_error = match self
            .dispatcher
            .on_fully_approved(request.request_type(), request.subject())
            .await
        {
            Ok(()) => None,
            Err(e) => {
                error!(
                    request_id = %request.id(),
                    request_type = %request.request_type(),
                    error = %e,
                    "terminal side effect failed after approval was committed"
                );
                Some(e)
            }
        };

        ApproveOutcome {
            is_fully_approved: true,
            next_stage: None,
            side_effect_error,
        }
    }

    async fn load_for_decision(
        &self,
        step_id: StepId,
    ) -> Result<(ApprovalRequest, Vec<ApprovalStep>, ApprovalStep), EngineError> {
        let step = self
            .ledger
            .get_step(step_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("Step '{}' not found", step_id)))?;
        let request = self.require_request(step.request_id()).await?;
        let steps = self.ledger.steps(request.id()).await?;
        Ok((request, steps, step))
    }

    async fn require_request(
        &self,
        request_id: RequestId,
    ) -> Result<ApprovalRequest, EngineError> {
        self.ledger
            .get_request(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("Request '{}' not found", request_id)))
    }

    /// Guard approve/reject: request pending, step is the current actionable
    /// one, flow not frozen, actor authorized.
    async fn authorize(
        &self,
        request: &ApprovalRequest,
        steps: &[ApprovalStep],
        step: &ApprovalStep,
        actor: &Actor,
        action: Action,
    ) -> Result<(), EngineError> {
        if request.is_terminal() {
            return Err(EngineError::invalid_state(format!(
                "Request {} is already {:?}",
                request.id(),
                request.status()
            )));
        }

        let current = current_actionable_step(steps).ok_or_else(|| {
            EngineError::invalid_state(format!("Request {} has no actionable step", request.id()))
        })?;
        if current.id() != step.id() {
            return Err(EngineError::invalid_state(format!(
                "Step {} is not the current actionable step of request {}",
                step.step_number(),
                request.id()
            )));
        }

        if self.is_frozen(request.request_type()).await? {
            return Err(EngineError::flow_disabled(request.request_type()));
        }

        let ctx = RequestContext::new(request.requester_area().clone());
        let resolved = self.resolver.resolve(step.stage(), &ctx).await?;

        if resolved.approver_ids.contains(actor.identity()) {
            return Ok(());
        }

        if actor.is_admin() {
            let override_allowed = match action {
                Action::Approve => true,
                Action::Reject => self.config.admin_override_rejects,
            };
            if override_allowed {
                info!(
                    request_id = %request.id(),
                    step_number = step.step_number(),
                    admin = %actor.identity(),
                    "acting through admin override"
                );
                return Ok(());
            }
        }

        Err(EngineError::not_authorized(
            actor.identity().as_str(),
            format!(
                "not an approver for stage '{}' of request {}",
                step.stage(),
                request.id()
            ),
        ))
    }

    /// Whether in-flight requests of this type are frozen by a disabled flow
    async fn is_frozen(&self, request_type: RequestType) -> Result<bool, EngineError> {
        if self.config.disabled_flow_policy != DisabledFlowPolicy::FreezeInFlight {
            return Ok(false);
        }
        let flow = self.flows.get_flow(request_type).await?;
        Ok(!flow.is_enabled())
    }
}
