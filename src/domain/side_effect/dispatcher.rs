//! Side-effect handler trait and dispatcher

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::error::EngineError;
use crate::domain::flow::RequestType;
use crate::domain::request::SubjectRef;

/// Terminal action for a fully approved request.
///
/// Implementations mutate domain entities owned by external collaborators.
/// Failures are surfaced to the approve caller but never roll back the
/// already-committed approval; retry policy belongs to the handler.
#[async_trait]
pub trait SideEffectHandler: Send + Sync + std::fmt::Debug {
    async fn on_fully_approved(&self, subject: &SubjectRef) -> Result<(), EngineError>;
}

/// Registry mutating collaborator for provider entities.
///
/// The termination flow's terminal action deactivates the referenced
/// provider through this seam.
#[async_trait]
pub trait ProviderRegistry: Send + Sync + std::fmt::Debug {
    async fn deactivate(&self, provider_id: &str) -> Result<(), EngineError>;
}

/// Maps request types to their injected terminal actions.
///
/// Zero or one handler per request type; types without a handler complete
/// with no side effect.
#[derive(Debug, Clone, Default)]
pub struct SideEffectDispatcher {
    handlers: HashMap<RequestType, Arc<dyn SideEffectHandler>>,
}

impl SideEffectDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a request type, replacing any previous one
    pub fn with_handler(
        mut self,
        request_type: RequestType,
        handler: Arc<dyn SideEffectHandler>,
    ) -> Self {
        self.handlers.insert(request_type, handler);
        self
    }

    /// Whether a request type has a registered terminal action
    pub fn has_handler(&self, request_type: RequestType) -> bool {
        self.handlers.contains_key(&request_type)
    }

    /// Invoke the terminal action for a fully approved request.
    ///
    /// Called exactly once per completed request, after the ledger has
    /// durably recorded full approval.
    pub async fn on_fully_approved(
        &self,
        request_type: RequestType,
        subject: &SubjectRef,
    ) -> Result<(), EngineError> {
        let Some(handler) = self.handlers.get(&request_type) else {
            debug!(%request_type, %subject, "no terminal action registered");
            return Ok(());
        };

        handler
            .on_fully_approved(subject)
            .await
            .map_err(|e| EngineError::side_effect(request_type, e.to_string()))?;

        info!(%request_type, %subject, "terminal action applied");
        Ok(())
    }
}
