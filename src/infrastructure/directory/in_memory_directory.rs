//! In-memory organization directory

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AreaName, EngineError, HierarchyRole, Identity, OrganizationDirectory};

#[derive(Debug, Default)]
struct DirectoryState {
    /// Area name -> designated approver (director), if assigned
    areas: HashMap<AreaName, Option<Identity>>,
    roles: HashMap<HierarchyRole, HashSet<Identity>>,
}

/// In-memory implementation of OrganizationDirectory.
///
/// Mutable at runtime so that approver resolution observes directory changes
/// immediately, the way a live org-chart backend would.
#[derive(Debug)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DirectoryState::default())),
        }
    }

    /// Register or replace an area and its designated approver
    pub async fn upsert_area(&self, area: AreaName, director: Option<Identity>) {
        let mut state = self.state.write().await;
        state.areas.insert(area, director);
    }

    /// Grant a hierarchy role to an identity
    pub async fn grant_role(&self, role: HierarchyRole, identity: Identity) {
        let mut state = self.state.write().await;
        state.roles.entry(role).or_default().insert(identity);
    }

    /// Revoke a hierarchy role from an identity
    pub async fn revoke_role(&self, role: HierarchyRole, identity: &Identity) {
        let mut state = self.state.write().await;
        if let Some(holders) = state.roles.get_mut(&role) {
            holders.remove(identity);
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationDirectory for InMemoryDirectory {
    async fn area_exists(&self, area: &AreaName) -> Result<bool, EngineError> {
        let state = self.state.read().await;
        Ok(state.areas.contains_key(area))
    }

    async fn area_director(&self, area: &AreaName) -> Result<Option<Identity>, EngineError> {
        let state = self.state.read().await;
        Ok(state.areas.get(area).cloned().flatten())
    }

    async fn role_holders(&self, role: HierarchyRole) -> Result<HashSet<Identity>, EngineError> {
        let state = self.state.read().await;
        Ok(state.roles.get(&role).cloned().unwrap_or_default())
    }
}
