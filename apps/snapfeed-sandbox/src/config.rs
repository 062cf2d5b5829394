//! Sandbox configuration loaded from environment variables.

use std::env;

use snapfeed_engine::EngineConfig;

use crate::telemetry::TelemetryConfig;

/// Sandbox configuration.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
    /// Handle of the scripted account.
    pub username: String,
    pub password: String,
}

impl SandboxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            telemetry: TelemetryConfig::from_env(),
            engine: EngineConfig::from_env(),
            username: env::var("SANDBOX_USERNAME").unwrap_or_else(|_| "jonas".to_string()),
            password: env::var("SANDBOX_PASSWORD").unwrap_or_else(|_| "correct-horse".to_string()),
        }
    }

    pub fn email(&self) -> String {
        format!("{}@snapfeed.test", self.username)
    }
}
