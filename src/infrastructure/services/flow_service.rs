//! Flow configuration service - the flow configuration store

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    validate_stages, EngineError, FlowConfig, FlowConfigRepository, Identity,
    OrganizationDirectory, RequestType, StageRef,
};

/// Replacement flow definition for one request type
#[derive(Debug, Clone)]
pub struct FlowUpdate {
    pub request_type: RequestType,
    pub stages: Vec<StageRef>,
    pub enabled: bool,
}

impl FlowUpdate {
    pub fn new(request_type: RequestType, stages: Vec<StageRef>) -> Self {
        Self {
            request_type,
            stages,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Flow configuration store.
///
/// Reads are unprivileged and far more frequent than writes; they always
/// yield a usable flow, falling back to the built-in default when nothing is
/// persisted or the persisted value is structurally invalid. Writes are
/// versioned copy-on-write updates; the administrator capability is checked
/// by the caller-side authorization collaborator before invocation.
pub struct FlowService {
    repository: Arc<dyn FlowConfigRepository>,
    directory: Arc<dyn OrganizationDirectory>,
}

impl std::fmt::Debug for FlowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowService").finish()
    }
}

impl FlowService {
    pub fn new(
        repository: Arc<dyn FlowConfigRepository>,
        directory: Arc<dyn OrganizationDirectory>,
    ) -> Self {
        Self {
            repository,
            directory,
        }
    }

    /// Get the effective flow for a request type.
    ///
    /// Falls back to the built-in default when no flow is persisted or the
    /// persisted value fails structural validation (logged, never silent).
    pub async fn get_flow(&self, request_type: RequestType) -> Result<FlowConfig, EngineError> {
        match self.repository.get(request_type).await? {
            Some(flow) if flow.is_structurally_valid() => Ok(flow),
            Some(flow) => {
                warn!(
                    %request_type,
                    version = flow.version(),
                    "persisted flow is structurally invalid, using built-in default"
                );
                Ok(FlowConfig::default_for(request_type))
            }
            None => Ok(FlowConfig::default_for(request_type)),
        }
    }

    /// Effective flows for every request type
    pub async fn list_flows(&self) -> Result<Vec<FlowConfig>, EngineError> {
        let mut flows = Vec::with_capacity(RequestType::ALL.len());
        for request_type in RequestType::ALL {
            flows.push(self.get_flow(request_type).await?);
        }
        Ok(flows)
    }

    /// Replace the flows for the given request types.
    ///
    /// Every update is validated before anything is persisted: structural
    /// rules plus every concrete stage naming an area the directory knows.
    pub async fn set_flows(
        &self,
        updates: Vec<FlowUpdate>,
        actor: &Identity,
    ) -> Result<Vec<FlowConfig>, EngineError> {
        if updates.is_empty() {
            return Err(EngineError::validation("No flow updates given"));
        }

        for update in &updates {
            self.validate_update(update).await?;
        }

        let mut persisted = Vec::with_capacity(updates.len());
        for update in updates {
            let current = self.get_flow(update.request_type).await?;
            let next = current.updated(update.stages, update.enabled, actor)?;
            let stored = self.repository.upsert(next).await?;

            info!(
                request_type = %stored.request_type(),
                version = stored.version(),
                updated_by = %actor,
                "flow configuration updated"
            );
            persisted.push(stored);
        }

        Ok(persisted)
    }

    /// Revert every request type to its built-in default flow, versioned
    pub async fn reset_flows(&self, actor: &Identity) -> Result<Vec<FlowConfig>, EngineError> {
        let mut persisted = Vec::with_capacity(RequestType::ALL.len());
        for request_type in RequestType::ALL {
            let current = self.get_flow(request_type).await?;
            let reverted = current.reverted_to_default(actor);
            let stored = self.repository.upsert(reverted).await?;

            info!(
                request_type = %stored.request_type(),
                version = stored.version(),
                updated_by = %actor,
                "flow configuration reset to default"
            );
            persisted.push(stored);
        }

        Ok(persisted)
    }

    async fn validate_update(&self, update: &FlowUpdate) -> Result<(), EngineError> {
        validate_stages(&update.stages)?;

        for stage in &update.stages {
            let StageRef::Area(area) = stage else {
                continue;
            };
            if !self.directory.area_exists(area).await? {
                return Err(EngineError::validation(format!(
                    "Stage '{}' does not name a known organizational area",
                    area
                )));
            }
        }

        Ok(())
    }
}
