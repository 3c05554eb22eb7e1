//! Flow configuration entities

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::directory::AreaName;
use crate::domain::error::EngineError;
use crate::domain::identity::Identity;

/// Minimum number of stages in a valid flow
pub const MIN_FLOW_STAGES: usize = 2;

/// Symbolic marker for the requester's own area, resolved per request
pub const REQUESTER_AREA_MARKER: &str = "REQUESTER_AREA";

/// Types of back-office requests, each with its own approval flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Recess,
    Termination,
    Hiring,
    Purchase,
    Remuneration,
}

impl RequestType {
    /// All request types, in presentation order
    pub const ALL: [RequestType; 5] = [
        Self::Recess,
        Self::Termination,
        Self::Hiring,
        Self::Purchase,
        Self::Remuneration,
    ];

    /// Display label for presentation boundaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recess => "Recesso",
            Self::Termination => "Desligamento",
            Self::Hiring => "Contratação",
            Self::Purchase => "Compra",
            Self::Remuneration => "Remuneração",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Recess => "recess",
            Self::Termination => "termination",
            Self::Hiring => "hiring",
            Self::Purchase => "purchase",
            Self::Remuneration => "remuneration",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named point in a flow: either the symbolic requester-area marker or a
/// concrete organizational area.
///
/// Stages are resolved to approver identities at evaluation time, never at
/// configuration time, because area directors change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StageRef {
    RequesterArea,
    Area(AreaName),
}

impl StageRef {
    /// Parse a configured stage name
    pub fn parse(value: impl Into<String>) -> Result<Self, EngineError> {
        let value = value.into();
        if value == REQUESTER_AREA_MARKER {
            return Ok(Self::RequesterArea);
        }
        Ok(Self::Area(AreaName::new(value)?))
    }

    /// Shorthand for a concrete-area stage
    pub fn area(name: impl Into<String>) -> Result<Self, EngineError> {
        Ok(Self::Area(AreaName::new(name)?))
    }

    /// The configured stage name (marker or area name)
    pub fn name(&self) -> &str {
        match self {
            Self::RequesterArea => REQUESTER_AREA_MARKER,
            Self::Area(name) => name.as_str(),
        }
    }

    /// The concrete area this stage points at for a given requester area
    pub fn resolved_area(&self, requester_area: &AreaName) -> AreaName {
        match self {
            Self::RequesterArea => requester_area.clone(),
            Self::Area(name) => name.clone(),
        }
    }

    /// Display name shown to users: the requester's area for the marker,
    /// otherwise the configured area name.
    pub fn display_name(&self, requester_area: &AreaName) -> String {
        self.resolved_area(requester_area).as_str().to_string()
    }
}

impl TryFrom<String> for StageRef {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StageRef> for String {
    fn from(stage: StageRef) -> Self {
        stage.name().to_string()
    }
}

impl fmt::Display for StageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Versioned, immutable approval flow for one request type.
///
/// Mutation is copy-on-write: [`FlowConfig::updated`] produces a new value
/// with the version bumped; live values are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Request type this flow applies to
    request_type: RequestType,

    /// Ordered approval stages; first is always the requester-area marker
    stages: Vec<StageRef>,

    /// Whether new requests of this type may be created
    enabled: bool,

    /// Monotonic configuration version
    version: u32,

    /// Administrator who last updated the flow (None for built-in defaults)
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_by: Option<Identity>,

    /// When the flow was last updated
    updated_at: DateTime<Utc>,
}

impl FlowConfig {
    /// Create a validated flow configuration
    pub fn new(request_type: RequestType, stages: Vec<StageRef>) -> Result<Self, EngineError> {
        validate_stages(&stages)?;
        Ok(Self {
            request_type,
            stages,
            enabled: true,
            version: 1,
            updated_by: None,
            updated_at: Utc::now(),
        })
    }

    /// Built-in default flow for a request type
    pub fn default_for(request_type: RequestType) -> Self {
        let area = |name: &str| StageRef::Area(AreaName::new(name).expect("default area name"));
        let stages = match request_type {
            RequestType::Recess => vec![StageRef::RequesterArea, area("Recursos Humanos")],
            RequestType::Termination => vec![
                StageRef::RequesterArea,
                area("Recursos Humanos"),
                area("Diretoria Executiva"),
            ],
            RequestType::Hiring => vec![
                StageRef::RequesterArea,
                area("Recursos Humanos"),
                area("Diretoria Executiva"),
            ],
            RequestType::Purchase => vec![StageRef::RequesterArea, area("Financeiro")],
            RequestType::Remuneration => vec![
                StageRef::RequesterArea,
                area("Recursos Humanos"),
                area("Financeiro"),
            ],
        };

        Self {
            request_type,
            stages,
            enabled: true,
            version: 1,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    /// Copy-on-write update: new value with the version bumped
    pub fn updated(
        &self,
        stages: Vec<StageRef>,
        enabled: bool,
        actor: &Identity,
    ) -> Result<Self, EngineError> {
        validate_stages(&stages)?;
        Ok(Self {
            request_type: self.request_type,
            stages,
            enabled,
            version: self.version + 1,
            updated_by: Some(actor.clone()),
            updated_at: Utc::now(),
        })
    }

    /// Copy-on-write revert to the built-in default, keeping the version monotonic
    pub fn reverted_to_default(&self, actor: &Identity) -> Self {
        let default = Self::default_for(self.request_type);
        Self {
            request_type: self.request_type,
            stages: default.stages,
            enabled: default.enabled,
            version: self.version + 1,
            updated_by: Some(actor.clone()),
            updated_at: Utc::now(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    // Getters

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn stages(&self) -> &[StageRef] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn updated_by(&self) -> Option<&Identity> {
        self.updated_by.as_ref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Structural validity check, used when loading persisted flows
    pub fn is_structurally_valid(&self) -> bool {
        validate_stages(&self.stages).is_ok()
    }
}

/// Validate the structure of a stage list: minimum length, requester-area
/// marker first, no consecutive duplicates.
pub fn validate_stages(stages: &[StageRef]) -> Result<(), EngineError> {
    if stages.len() < MIN_FLOW_STAGES {
        return Err(EngineError::validation(format!(
            "Flow must have at least {} stages, got {}",
            MIN_FLOW_STAGES,
            stages.len()
        )));
    }

    if stages[0] != StageRef::RequesterArea {
        return Err(EngineError::validation(format!(
            "First stage must be the {} marker",
            REQUESTER_AREA_MARKER
        )));
    }

    for pair in stages.windows(2) {
        if pair[0] == pair[1] {
            return Err(EngineError::validation(format!(
                "Consecutive duplicate stage '{}'",
                pair[0]
            )));
        }
    }

    Ok(())
}
