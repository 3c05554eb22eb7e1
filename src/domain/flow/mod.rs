//! Flow configuration domain
//!
//! Per request type, an ordered list of named approval stages plus an enabled
//! flag, versioned and backed by built-in defaults. Stage names are resolved
//! to approver identities at evaluation time, never at configuration time.

mod entity;
pub mod repository;

pub use entity::{
    validate_stages, FlowConfig, RequestType, StageRef, MIN_FLOW_STAGES, REQUESTER_AREA_MARKER,
};
pub use repository::FlowConfigRepository;

#[cfg(test)]
pub use repository::mock::MockFlowConfigRepository;
