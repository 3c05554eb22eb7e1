//! Infrastructure layer - Concrete implementations of domain traits

pub mod audit;
pub mod directory;
pub mod flow;
pub mod observability;
pub mod request;
pub mod services;
pub mod side_effect;

pub use audit::{RecordingAuditSink, TracingAuditSink};
pub use directory::InMemoryDirectory;
pub use flow::InMemoryFlowConfigRepository;
pub use request::InMemoryApprovalLedger;
pub use services::{ActionCheck, ApprovalService, ApproveOutcome, FlowService, FlowUpdate};
pub use side_effect::{DeactivateProviderHandler, InMemoryProviderRegistry};
