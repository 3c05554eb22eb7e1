//! Organization directory trait

use std::collections::HashSet;

use async_trait::async_trait;

use super::entity::{AreaName, HierarchyRole};
use crate::domain::error::EngineError;
use crate::domain::identity::Identity;

/// Read-only view of the organization structure.
///
/// Implemented by the external organization collaborator. Approver resolution
/// queries this on every authorization check so that role changes take effect
/// immediately; results must never be cached beyond a single call.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync + std::fmt::Debug {
    /// Check whether an area exists
    async fn area_exists(&self, area: &AreaName) -> Result<bool, EngineError>;

    /// The designated approver (director/head) of an area, if one is assigned
    async fn area_director(&self, area: &AreaName) -> Result<Option<Identity>, EngineError>;

    /// All identities currently holding a hierarchy role
    async fn role_holders(&self, role: HierarchyRole) -> Result<HashSet<Identity>, EngineError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock organization directory for testing
    #[derive(Debug, Default)]
    pub struct MockDirectory {
        areas: Mutex<HashMap<String, Option<Identity>>>,
        roles: Mutex<HashMap<HierarchyRole, HashSet<Identity>>>,
        should_fail: Mutex<Option<String>>,
    }

    impl MockDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an area with a designated director
        pub fn with_area(self, area: &str, director: Option<&str>) -> Self {
            let director = director.map(|d| Identity::new(d).unwrap());
            self.areas
                .lock()
                .unwrap()
                .insert(area.to_string(), director);
            self
        }

        /// Register a role holder
        pub fn with_role_holder(self, role: HierarchyRole, identity: &str) -> Self {
            self.roles
                .lock()
                .unwrap()
                .entry(role)
                .or_default()
                .insert(Identity::new(identity).unwrap());
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.should_fail.lock().unwrap() = Some(error.into());
            self
        }

        fn check_error(&self) -> Result<(), EngineError> {
            if let Some(ref msg) = *self.should_fail.lock().unwrap() {
                return Err(EngineError::storage(msg.clone()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl OrganizationDirectory for MockDirectory {
        async fn area_exists(&self, area: &AreaName) -> Result<bool, EngineError> {
            self.check_error()?;
            Ok(self.areas.lock().unwrap().contains_key(area.as_str()))
        }

        async fn area_director(&self, area: &AreaName) -> Result<Option<Identity>, EngineError> {
            self.check_error()?;
            Ok(self
                .areas
                .lock()
                .unwrap()
                .get(area.as_str())
                .cloned()
                .flatten())
        }

        async fn role_holders(
            &self,
            role: HierarchyRole,
        ) -> Result<HashSet<Identity>, EngineError> {
            self.check_error()?;
            Ok(self
                .roles
                .lock()
                .unwrap()
                .get(&role)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_area_lookup() {
            let directory = MockDirectory::new()
                .with_area("Financeiro", Some("carla.lima"))
                .with_area("Compras", None);

            let financeiro = AreaName::new("Financeiro").unwrap();
            assert!(directory.area_exists(&financeiro).await.unwrap());
            assert_eq!(
                directory.area_director(&financeiro).await.unwrap(),
                Some(Identity::new("carla.lima").unwrap())
            );

            let compras = AreaName::new("Compras").unwrap();
            assert!(directory.area_exists(&compras).await.unwrap());
            assert_eq!(directory.area_director(&compras).await.unwrap(), None);

            let unknown = AreaName::new("Inexistente").unwrap();
            assert!(!directory.area_exists(&unknown).await.unwrap());
        }

        #[tokio::test]
        async fn test_mock_role_holders() {
            let directory = MockDirectory::new()
                .with_role_holder(HierarchyRole::Ceo, "presidente")
                .with_role_holder(HierarchyRole::HrDirector, "rh.diretor");

            let holders = directory.role_holders(HierarchyRole::Ceo).await.unwrap();
            assert_eq!(holders.len(), 1);
            assert!(holders.contains(&Identity::new("presidente").unwrap()));

            let empty = directory.role_holders(HierarchyRole::Cfo).await.unwrap();
            assert!(empty.is_empty());
        }

        #[tokio::test]
        async fn test_mock_with_error() {
            let directory = MockDirectory::new().with_error("directory offline");
            let area = AreaName::new("Financeiro").unwrap();

            let result = directory.area_exists(&area).await;
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("directory offline"));
        }
    }
}
