use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::CodeSandbox;
use crate::config::types::SandboxConfig;
use crate::core_types::{ExecutionResult, SandboxRequest, SandboxResponse, WrappedProgram};
use crate::errors::EvalError;
use crate::extractor::extract_result;

pub const SANDBOX_RUN_PATH: &str = "/v1/sandbox/run";
pub const SANDBOX_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SandboxClient {
    pub fn new(config: &SandboxConfig) -> Result<Self, EvalError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(SANDBOX_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EvalError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    pub fn run_url(&self) -> String {
        format!("{}{}", self.endpoint, SANDBOX_RUN_PATH)
    }

    /// Turns a 200 response body into an execution result.
    pub fn interpret_response(body: &str) -> ExecutionResult {
        let status_code = StatusCode::OK.as_u16();

        let envelope: SandboxResponse = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return ExecutionResult {
                    status_code,
                    body: body.to_string(),
                    error: Some(EvalError::InvalidResponse(format!(
                        "Failed to parse sandbox response: {}",
                        e
                    ))),
                }
            }
        };

        if envelope.code != 0 {
            return ExecutionResult {
                status_code,
                body: body.to_string(),
                error: Some(EvalError::ExecutionFailure(format!(
                    "Got error code: {}. Got error msg: {}",
                    envelope.code, envelope.message
                ))),
            };
        }

        let data = envelope.data.unwrap_or_default();
        if !data.error.is_empty() {
            return ExecutionResult {
                status_code,
                body: String::new(),
                error: Some(EvalError::ExecutionFailure(data.error)),
            };
        }

        match extract_result(&data.stdout) {
            Ok(output) => ExecutionResult {
                status_code,
                body: output,
                error: None,
            },
            Err(e) => ExecutionResult {
                status_code,
                body: String::new(),
                error: Some(EvalError::Extraction(e)),
            },
        }
    }
}

#[async_trait]
impl CodeSandbox for SandboxClient {
    async fn execute(
        &self,
        program: &WrappedProgram,
        enable_network: bool,
    ) -> Result<ExecutionResult, EvalError> {
        let request = SandboxRequest {
            language: program.language.clone(),
            code: program.final_code.clone(),
            preload: program.preload_script.clone(),
            enable_network,
        };

        let url = self.run_url();
        log::debug!("Sandbox request to {} ({})", url, request.language);
        log::debug!("Sandbox code:\n{}", request.code);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err_msg = format!("HTTP request to sandbox failed: {}", e);
                log::error!("{}", err_msg);
                EvalError::TransportError(err_msg)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            EvalError::TransportError(format!("Failed to read sandbox response: {}", e))
        })?;

        log::debug!("Sandbox response ({}): {}", status, body);

        if status != StatusCode::OK {
            log::warn!("Sandbox returned status {}", status);
            return Ok(ExecutionResult {
                status_code: status.as_u16(),
                body,
                error: None,
            });
        }

        Ok(Self::interpret_response(&body))
    }
}
