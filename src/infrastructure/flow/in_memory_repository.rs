//! In-memory flow configuration repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{EngineError, FlowConfig, FlowConfigRepository, RequestType};

/// In-memory implementation of FlowConfigRepository
#[derive(Debug)]
pub struct InMemoryFlowConfigRepository {
    flows: Arc<RwLock<HashMap<RequestType, FlowConfig>>>,
}

impl InMemoryFlowConfigRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            flows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with flows
    pub fn with_flows(flows: Vec<FlowConfig>) -> Self {
        let map: HashMap<RequestType, FlowConfig> = flows
            .into_iter()
            .map(|flow| (flow.request_type(), flow))
            .collect();

        Self {
            flows: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryFlowConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlowConfigRepository for InMemoryFlowConfigRepository {
    async fn get(&self, request_type: RequestType) -> Result<Option<FlowConfig>, EngineError> {
        let flows = self.flows.read().await;
        Ok(flows.get(&request_type).cloned())
    }

    async fn list(&self) -> Result<Vec<FlowConfig>, EngineError> {
        let flows = self.flows.read().await;
        Ok(flows.values().cloned().collect())
    }

    async fn upsert(&self, flow: FlowConfig) -> Result<FlowConfig, EngineError> {
        let mut flows = self.flows.write().await;
        flows.insert(flow.request_type(), flow.clone());
        Ok(flow)
    }
}
