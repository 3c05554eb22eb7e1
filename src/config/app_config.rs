use serde::Deserialize;

use crate::domain::HierarchyRole;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Behavior of an administratively disabled flow towards requests that are
/// already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisabledFlowPolicy {
    /// Only new request creation is blocked; in-flight requests proceed
    #[default]
    BlockNewOnly,
    /// In-flight requests of the disabled type are frozen as well
    FreezeInFlight,
}

/// Engine business-rule configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Minimum rejection comment length, in characters
    #[serde(default = "default_min_reject_comment_chars")]
    pub min_reject_comment_chars: usize,

    /// Role escalated to when an area has no designated approver
    #[serde(default = "default_fallback_role")]
    pub fallback_role: HierarchyRole,

    /// What a disabled flow means for in-flight requests
    #[serde(default)]
    pub disabled_flow_policy: DisabledFlowPolicy,

    /// Whether the admin override also permits rejecting arbitrary steps
    #[serde(default = "default_admin_override_rejects")]
    pub admin_override_rejects: bool,
}

fn default_min_reject_comment_chars() -> usize {
    3
}

fn default_fallback_role() -> HierarchyRole {
    HierarchyRole::Ceo
}

fn default_admin_override_rejects() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_reject_comment_chars: default_min_reject_comment_chars(),
            fallback_role: default_fallback_role(),
            disabled_flow_policy: DisabledFlowPolicy::default(),
            admin_override_rejects: default_admin_override_rejects(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Local .env files are optional
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
