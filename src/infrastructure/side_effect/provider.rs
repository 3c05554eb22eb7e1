//! Provider deactivation side effect

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{EngineError, ProviderRegistry, SideEffectHandler, SubjectRef};

/// In-memory provider registry.
///
/// Stands in for the external system of record that owns provider entities.
#[derive(Debug, Default)]
pub struct InMemoryProviderRegistry {
    /// Provider id -> active flag
    providers: Arc<RwLock<HashMap<String, bool>>>,
}

impl InMemoryProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active provider
    pub async fn register(&self, provider_id: impl Into<String>) {
        let mut providers = self.providers.write().await;
        providers.insert(provider_id.into(), true);
    }

    /// Whether a provider is currently active
    pub async fn is_active(&self, provider_id: &str) -> Option<bool> {
        let providers = self.providers.read().await;
        providers.get(provider_id).copied()
    }
}

#[async_trait]
impl ProviderRegistry for InMemoryProviderRegistry {
    async fn deactivate(&self, provider_id: &str) -> Result<(), EngineError> {
        let mut providers = self.providers.write().await;
        match providers.get_mut(provider_id) {
            Some(active) => {
                *active = false;
                Ok(())
            }
            None => Err(EngineError::not_found(format!(
                "Provider '{}' not found",
                provider_id
            ))),
        }
    }
}

/// Terminal action for fully approved termination requests: deactivates the
/// referenced provider through the registry collaborator.
#[derive(Debug)]
pub struct DeactivateProviderHandler {
    registry: Arc<dyn ProviderRegistry>,
}

impl DeactivateProviderHandler {
    pub fn new(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SideEffectHandler for DeactivateProviderHandler {
    async fn on_fully_approved(&self, subject: &SubjectRef) -> Result<(), EngineError> {
        self.registry.deactivate(subject.entity_id()).await?;
        info!(provider_id = subject.entity_id(), "provider deactivated");
        Ok(())
    }
}
