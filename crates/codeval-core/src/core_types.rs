//! Shared data model for an evaluation run
//!
//! Test cases flow in from a file, get turned into wrapped programs, travel
//! to the sandbox as requests and come back as execution results, and end
//! up as test results owned by the metrics aggregator.

use crate::config::types::ModelConfig;
use crate::errors::EvalError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One known-answer case: an instruction for the generator plus the inputs
/// its `main` is called with and the expected output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    pub instruction: String,
    #[serde(alias = "codeLanguage")]
    pub code_language: String,
    #[serde(alias = "groundTruth")]
    pub ground_truth: String,
}

/// Executable source produced by a template transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedProgram {
    /// Runtime name understood by the sandbox backend.
    pub language: String,
    pub final_code: String,
    pub preload_script: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SandboxRequest {
    pub language: String,
    pub code: String,
    pub preload: String,
    pub enable_network: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SandboxResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<SandboxResponseData>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SandboxResponseData {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub stdout: String,
}

/// Outcome of one sandbox call.
///
/// `error` is set when the sandboxed program failed or its output could not
/// be extracted. On success `body` holds the canonical JSON result; on a
/// non-200 response it holds the raw response text.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status_code: u16,
    pub body: String,
    pub error: Option<EvalError>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status_code == 200 && self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub test_case: TestCase,
    pub success: bool,
    pub actual_value: String,
    pub error: Option<EvalError>,
}

impl TestResult {
    pub fn failed(test_case: TestCase, error: EvalError) -> Self {
        Self {
            test_case,
            success: false,
            actual_value: String::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CodeGenerationRequest {
    pub instruction: String,
    pub code_language: String,
    pub no_variable: bool,
    pub model_config: ModelConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeneratedCode {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub error: String,
}
