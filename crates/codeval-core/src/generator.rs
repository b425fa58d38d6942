//! Code generation collaborator.
//!
//! The service under evaluation is reached through the console API. It takes
//! an instruction and a target language and answers with source code that
//! defines a `main` function.

use async_trait::async_trait;
use reqwest::Client;

use crate::core_types::{CodeGenerationRequest, GeneratedCode};
use crate::errors::EvalError;

pub const CODE_GENERATE_PATH: &str = "/console/api/rule-code-generate";

#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, request: &CodeGenerationRequest) -> Result<GeneratedCode, EvalError>;
}

pub struct ConsoleCodeGenerator {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ConsoleCodeGenerator {
    pub fn new(base_url: &str, access_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }
}

#[async_trait]
impl CodeGenerator for ConsoleCodeGenerator {
    async fn generate(&self, request: &CodeGenerationRequest) -> Result<GeneratedCode, EvalError> {
        let url = format!("{}{}", self.base_url, CODE_GENERATE_PATH);
        log::debug!(
            "Requesting {} code generation from {}",
            request.code_language,
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| EvalError::GenerationError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| EvalError::GenerationError(format!("Failed to read response: {}", e)))?;

        log::debug!("Code generation response ({}): {}", status, response_text);

        if !status.is_success() {
            return Err(EvalError::GenerationError(format!(
                "Code generation request failed with status {}: {}",
                status, response_text
            )));
        }

        let generated: GeneratedCode = serde_json::from_str(&response_text).map_err(|e| {
            EvalError::GenerationError(format!("Failed to parse code generation response: {}", e))
        })?;

        if !generated.error.is_empty() {
            return Err(EvalError::GenerationError(generated.error));
        }

        Ok(generated)
    }
}
