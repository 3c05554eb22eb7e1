//! Application services

mod approval_service;
mod flow_service;

pub use approval_service::{ActionCheck, ApprovalService, ApproveOutcome};
pub use flow_service::{FlowService, FlowUpdate};
