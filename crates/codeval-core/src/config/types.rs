//! Configuration type definitions for an evaluation run
//!
//! One `EvalConfig` is built at process start and handed explicitly to the
//! clients that need it. Secrets may be given inline or through the name of
//! an environment variable (`*_env`), which the loader resolves.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::EvalError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvalConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Console API used for login and code generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_enable_network")]
    pub enable_network: bool,
}

/// Model selection forwarded untouched to the code generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub completion_params: CompletionParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CompletionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub test_cases: Option<PathBuf>,
    #[serde(default)]
    pub no_variable: bool,
}

fn default_enable_network() -> bool {
    true
}

fn default_mode() -> String {
    "chat".to_string()
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            api_key_env: None,
            enable_network: default_enable_network(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            name: String::new(),
            mode: default_mode(),
            completion_params: CompletionParams::default(),
        }
    }
}

impl SandboxConfig {
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }
}

impl ConsoleConfig {
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.console.base_url.is_empty() {
            return Err(EvalError::ConfigError("Console base_url cannot be empty".to_string()));
        }
        if self.console.email.is_empty() {
            return Err(EvalError::ConfigError("Console email cannot be empty".to_string()));
        }
        if self.console.password().is_empty() {
            return Err(EvalError::ConfigError("Console password is not set".to_string()));
        }

        self.sandbox.validate()?;

        if self.model.provider.is_empty() {
            return Err(EvalError::ConfigError("Model provider cannot be empty".to_string()));
        }
        if self.model.name.is_empty() {
            return Err(EvalError::ConfigError("Model name cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.endpoint.is_empty() {
            return Err(EvalError::ConfigError("Sandbox endpoint cannot be empty".to_string()));
        }
        if self.api_key().is_empty() {
            return Err(EvalError::ConfigError("Sandbox API key is not set".to_string()));
        }
        Ok(())
    }
}
