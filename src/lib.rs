//! HCM Approvals
//!
//! Approval workflow engine for back-office human-capital requests:
//! - Configurable per-type approval flows with versioned updates
//! - Strict left-to-right step progression with a derived actionable step
//! - Stage-to-approver resolution against a live organization directory
//! - Exactly-once terminal side effects on full approval
//! - Structured audit trail of every state transition

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{
    ApprovalLedger, ApproverResolver, AuditSink, FlowConfigRepository, OrganizationDirectory,
    RequestType, SideEffectDispatcher, SideEffectHandler,
};
use infrastructure::{
    ApprovalService, DeactivateProviderHandler, FlowService, InMemoryApprovalLedger,
    InMemoryDirectory, InMemoryFlowConfigRepository, InMemoryProviderRegistry, TracingAuditSink,
};
use tracing::info;

/// Fully wired engine with shared handles to its collaborators
pub struct Engine {
    pub flow_service: Arc<FlowService>,
    pub approval_service: Arc<ApprovalService>,
    pub directory: Arc<InMemoryDirectory>,
    pub provider_registry: Arc<InMemoryProviderRegistry>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish()
    }
}

/// Create an engine with default configuration and in-memory collaborators
pub fn create_engine() -> anyhow::Result<Engine> {
    create_engine_with_config(&AppConfig::default())
}

/// Create an engine with custom configuration.
///
/// Wires the in-memory implementations of every collaborator; embedders that
/// bring their own directory, ledger, or audit sink should assemble the
/// services directly instead.
pub fn create_engine_with_config(config: &AppConfig) -> anyhow::Result<Engine> {
    let directory = Arc::new(InMemoryDirectory::new());
    let flow_repository: Arc<dyn FlowConfigRepository> =
        Arc::new(InMemoryFlowConfigRepository::new());
    let ledger: Arc<dyn ApprovalLedger> = Arc::new(InMemoryApprovalLedger::new());
    let audit: Arc<dyn AuditSink> = Arc::new(TracingAuditSink::new());

    let provider_registry = Arc::new(InMemoryProviderRegistry::new());
    let dispatcher = SideEffectDispatcher::new().with_handler(
        RequestType::Termination,
        Arc::new(DeactivateProviderHandler::new(provider_registry.clone()))
            as Arc<dyn SideEffectHandler>,
    );

    let directory_trait: Arc<dyn OrganizationDirectory> = directory.clone();
    let flow_service = Arc::new(FlowService::new(flow_repository, directory_trait.clone()));
    let resolver = ApproverResolver::new(directory_trait, config.engine.fallback_role);

    let approval_service = Arc::new(ApprovalService::new(
        ledger,
        flow_service.clone(),
        resolver,
        dispatcher,
        audit,
        config.engine.clone(),
    ));

    info!("Approval engine initialized");

    Ok(Engine {
        flow_service,
        approval_service,
        directory,
        provider_registry,
    })
}
