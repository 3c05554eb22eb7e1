//! Flow configuration repository trait

use async_trait::async_trait;

use super::entity::{FlowConfig, RequestType};
use crate::domain::error::EngineError;

/// Repository trait for flow configuration persistence
#[async_trait]
pub trait FlowConfigRepository: Send + Sync + std::fmt::Debug {
    /// Get the persisted flow for a request type, if any
    async fn get(&self, request_type: RequestType) -> Result<Option<FlowConfig>, EngineError>;

    /// List all persisted flows
    async fn list(&self) -> Result<Vec<FlowConfig>, EngineError>;

    /// Insert or replace the flow for its request type
    async fn upsert(&self, flow: FlowConfig) -> Result<FlowConfig, EngineError>;
}
