//! Configuration loader for YAML files and environment resolution
//!
//! A config file is optional. Every setting that the deployment usually
//! supplies through the environment can be overridden by a variable, and a
//! run can be configured from the environment alone.

use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::types::*;
use crate::errors::EvalError;

pub const CONSOLE_API_URL: &str = "CONSOLE_API_URL";
pub const CONSOLE_EMAIL: &str = "CONSOLE_EMAIL";
pub const CONSOLE_PASSWORD: &str = "CONSOLE_PASSWORD";
pub const CODE_EXECUTION_ENDPOINT: &str = "CODE_EXECUTION_ENDPOINT";
pub const CODE_EXECUTION_API_KEY: &str = "CODE_EXECUTION_API_KEY";
pub const MODEL_PROVIDER: &str = "MODEL_PROVIDER";
pub const MODEL_NAME: &str = "MODEL_NAME";
pub const TEST_CASES_FILE: &str = "TEST_CASES_FILE";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<EvalConfig, EvalError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            EvalError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        log::info!("Loaded configuration file {}", path.display());
        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<EvalConfig, EvalError> {
        let mut config: EvalConfig = serde_yaml::from_str(content)
            .map_err(|e| EvalError::ConfigError(format!("Failed to parse YAML config: {}", e)))?;

        Self::resolve_environment(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> Result<EvalConfig, EvalError> {
        let mut config = EvalConfig::default();
        Self::resolve_environment(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn resolve_environment(config: &mut EvalConfig) {
        override_from_env(&mut config.console.base_url, CONSOLE_API_URL);
        override_from_env(&mut config.console.email, CONSOLE_EMAIL);
        config.console.password = resolve_secret(
            config.console.password.take(),
            config.console.password_env.as_deref(),
            CONSOLE_PASSWORD,
        );

        override_from_env(&mut config.sandbox.endpoint, CODE_EXECUTION_ENDPOINT);
        config.sandbox.api_key = resolve_secret(
            config.sandbox.api_key.take(),
            config.sandbox.api_key_env.as_deref(),
            CODE_EXECUTION_API_KEY,
        );

        override_from_env(&mut config.model.provider, MODEL_PROVIDER);
        override_from_env(&mut config.model.name, MODEL_NAME);

        if let Some(path) = non_empty_var(TEST_CASES_FILE) {
            config.evaluation.test_cases = Some(PathBuf::from(path));
        }

        // Trailing slashes would double up when endpoint paths are appended
        config.console.base_url = config.console.base_url.trim_end_matches('/').to_string();
        config.sandbox.endpoint = config.sandbox.endpoint.trim_end_matches('/').to_string();
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn override_from_env(field: &mut String, key: &str) {
    if let Some(value) = non_empty_var(key) {
        *field = value;
    }
}

/// A named variable wins, then the well-known variable, then the inline value.
fn resolve_secret(inline: Option<String>, env_name: Option<&str>, default_env: &str) -> Option<String> {
    if let Some(value) = env_name.and_then(non_empty_var) {
        return Some(value);
    }
    if let Some(value) = non_empty_var(default_env) {
        return Some(value);
    }
    inline.filter(|v| !v.is_empty())
}
