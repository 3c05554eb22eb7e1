//! Domain layer - Core business logic and entities

pub mod audit;
pub mod directory;
pub mod error;
pub mod flow;
pub mod identity;
pub mod request;
pub mod resolver;
pub mod side_effect;

pub use audit::{AuditEvent, AuditSink};
pub use directory::{AreaName, HierarchyRole, OrganizationDirectory};
pub use error::EngineError;
pub use flow::{
    validate_stages, FlowConfig, FlowConfigRepository, RequestType, StageRef, MIN_FLOW_STAGES,
    REQUESTER_AREA_MARKER,
};
pub use identity::{Actor, Identity};
pub use request::{
    current_actionable_step, ApprovalLedger, ApprovalRequest, ApprovalStep, RequestId,
    RequestStatus, RequestTransition, StepDecision, StepId, StepStatus, SubjectRef,
};
pub use resolver::{ApproverResolver, RequestContext, ResolvedApprovers};
pub use side_effect::{ProviderRegistry, SideEffectDispatcher, SideEffectHandler};
