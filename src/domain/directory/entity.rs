//! Organizational areas and hierarchy roles

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

/// Maximum length for organizational area names
pub const MAX_AREA_NAME_LENGTH: usize = 80;

/// Validated organizational area name (e.g. "Financeiro", "Recursos Humanos")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaName(String);

impl AreaName {
    /// Create a new validated area name
    pub fn new(name: impl Into<String>) -> Result<Self, EngineError> {
        let name = name.into();
        validate_area_name(&name)?;
        Ok(Self(name))
    }

    /// Get the area name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AreaName {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AreaName> for String {
    fn from(name: AreaName) -> Self {
        name.0
    }
}

impl fmt::Display for AreaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AreaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate an area name string
pub fn validate_area_name(name: &str) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("Area name cannot be empty"));
    }

    if name != name.trim() {
        return Err(EngineError::validation(format!(
            "Area name '{}' must not have leading or trailing whitespace",
            name
        )));
    }

    if name.chars().count() > MAX_AREA_NAME_LENGTH {
        return Err(EngineError::validation(format!(
            "Area name exceeds maximum length of {} characters",
            MAX_AREA_NAME_LENGTH
        )));
    }

    Ok(())
}

/// Hierarchy roles recognized by the organization directory.
///
/// Closed enumeration: presentation labels come from the exhaustive
/// [`HierarchyRole::label`] mapping, never from raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyRole {
    AreaDirector,
    HrDirector,
    Cfo,
    Ceo,
}

impl HierarchyRole {
    /// Display label for presentation boundaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::AreaDirector => "Diretor de Área",
            Self::HrDirector => "Diretor de RH",
            Self::Cfo => "Diretor Financeiro",
            Self::Ceo => "Diretor Executivo",
        }
    }
}

impl fmt::Display for HierarchyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
