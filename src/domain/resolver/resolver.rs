//! Stage-to-approver resolution

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::domain::directory::{AreaName, HierarchyRole, OrganizationDirectory};
use crate::domain::error::EngineError;
use crate::domain::flow::StageRef;
use crate::domain::identity::Identity;

/// Organizational context of the request being authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    requester_area: AreaName,
}

impl RequestContext {
    pub fn new(requester_area: AreaName) -> Self {
        Self { requester_area }
    }

    pub fn requester_area(&self) -> &AreaName {
        &self.requester_area
    }
}

/// Identities authorized to act at a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApprovers {
    /// Identities resolved from the directory for this stage
    pub approver_ids: HashSet<Identity>,

    /// Administrators may always act on any pending step; reported
    /// explicitly rather than hidden inside the approver set.
    pub is_admin_override_allowed: bool,

    /// Set when the area had no designated approver and resolution
    /// escalated to the fallback role's holders.
    pub escalated_to: Option<HierarchyRole>,
}

/// Resolves flow stages to approver identity sets against the live
/// organization directory.
#[derive(Debug, Clone)]
pub struct ApproverResolver {
    directory: Arc<dyn OrganizationDirectory>,
    fallback_role: HierarchyRole,
}

impl ApproverResolver {
    /// Create a resolver escalating to `fallback_role` when an area has no
    /// designated approver.
    pub fn new(directory: Arc<dyn OrganizationDirectory>, fallback_role: HierarchyRole) -> Self {
        Self {
            directory,
            fallback_role,
        }
    }

    pub fn fallback_role(&self) -> HierarchyRole {
        self.fallback_role
    }

    /// Resolve a stage to the identities authorized to act on it.
    ///
    /// The requester-area marker resolves against the request's own area;
    /// a concrete stage resolves against the named area at evaluation time.
    /// An area unknown to the directory is a configuration-integrity fault.
    pub async fn resolve(
        &self,
        stage: &StageRef,
        ctx: &RequestContext,
    ) -> Result<ResolvedApprovers, EngineError> {
        let area = stage.resolved_area(ctx.requester_area());

        if !self.directory.area_exists(&area).await? {
            return Err(EngineError::unresolved_stage(area.as_str()));
        }

        if let Some(director) = self.directory.area_director(&area).await? {
            return Ok(ResolvedApprovers {
                approver_ids: HashSet::from([director]),
                is_admin_override_allowed: true,
                escalated_to: None,
            });
        }

        // No designated approver: deterministic escalation to the fallback
        // role, reported rather than silent.
        let holders = self.directory.role_holders(self.fallback_role).await?;
        if holders.is_empty() {
            return Err(EngineError::unresolved_stage(format!(
                "{} (no designated approver and no {} fallback)",
                area, self.fallback_role
            )));
        }

        warn!(
            area = %area,
            fallback_role = %self.fallback_role,
            "area has no designated approver, escalating to fallback role"
        );

        Ok(ResolvedApprovers {
            approver_ids: holders,
            is_admin_override_allowed: true,
            escalated_to: Some(self.fallback_role),
        })
    }
}
