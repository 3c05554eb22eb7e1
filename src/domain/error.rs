use thiserror::Error;

use super::flow::RequestType;

/// Errors surfaced by the approval engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Stage '{stage}' does not resolve to any organizational area")]
    UnresolvedStage { stage: String },

    #[error("Identity '{identity}' is not authorized: {message}")]
    NotAuthorized { identity: String, message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Approval flow for {request_type} is disabled")]
    FlowDisabled { request_type: RequestType },

    #[error("Side effect for {request_type} failed: {message}")]
    SideEffect {
        request_type: RequestType,
        message: String,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unresolved_stage(stage: impl Into<String>) -> Self {
        Self::UnresolvedStage {
            stage: stage.into(),
        }
    }

    pub fn not_authorized(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotAuthorized {
            identity: identity.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn flow_disabled(request_type: RequestType) -> Self {
        Self::FlowDisabled { request_type }
    }

    pub fn side_effect(request_type: RequestType, message: impl Into<String>) -> Self {
        Self::SideEffect {
            request_type,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for errors that signal a lost race or stale client view.
    ///
    /// Callers treat these as a refresh-and-retry signal, not a fault.
    pub fn is_stale_view(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = EngineError::validation("comment too short");
        assert_eq!(error.to_string(), "Validation error: comment too short");
    }

    #[test]
    fn test_unresolved_stage_display() {
        let error = EngineError::unresolved_stage("Almoxarifado");
        assert_eq!(
            error.to_string(),
            "Stage 'Almoxarifado' does not resolve to any organizational area"
        );
    }

    #[test]
    fn test_flow_disabled_display() {
        let error = EngineError::flow_disabled(RequestType::Purchase);
        assert_eq!(error.to_string(), "Approval flow for purchase is disabled");
    }

    #[test]
    fn test_invalid_state_is_stale_view() {
        assert!(EngineError::invalid_state("step already decided").is_stale_view());
        assert!(!EngineError::validation("bad input").is_stale_view());
        assert!(!EngineError::not_found("missing").is_stale_view());
    }

    #[test]
    fn test_error_equality() {
        let err1 = EngineError::invalid_state("race lost");
        let err2 = EngineError::invalid_state("race lost");
        assert_eq!(err1, err2);
        assert_ne!(err1, EngineError::invalid_state("other"));
    }
}
