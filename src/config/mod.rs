//! Application configuration

mod app_config;

pub use app_config::{AppConfig, DisabledFlowPolicy, EngineConfig, LogFormat, LoggingConfig};
