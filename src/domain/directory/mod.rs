//! Organization directory
//!
//! Domain types for organizational areas and hierarchy roles, plus the
//! read-only directory trait the approver resolver consults at evaluation
//! time.

mod entity;
pub mod provider;

pub use entity::{validate_area_name, AreaName, HierarchyRole, MAX_AREA_NAME_LENGTH};
pub use provider::OrganizationDirectory;

#[cfg(test)]
pub use provider::mock::MockDirectory;
