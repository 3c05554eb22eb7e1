//! Approval requests and their step ledgers
//!
//! An [`ApprovalRequest`] is one workflow instance; its [`ApprovalStep`]s are
//! the materialized, persisted stages it must pass, in order. Steps are an
//! append/mutate-once audit trail: decided exactly once, never deleted, never
//! compacted.

mod entity;
pub mod repository;

pub use entity::{
    current_actionable_step, ApprovalRequest, ApprovalStep, RequestId, RequestStatus,
    StepDecision, StepId, StepStatus, SubjectRef,
};
pub use repository::{ApprovalLedger, RequestTransition};
