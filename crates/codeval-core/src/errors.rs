//! Error types for every failure mode of an evaluation run
//!
//! Errors are split by where they surface. Configuration, credential and
//! test-case errors are fatal and stop a run before the first case executes.
//! Everything else happens inside a single case and is recorded on that
//! case's result, so the variants carry owned strings and are `Clone`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to encode inputs: {0}")]
    EncodingError(String),
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Execution failed: {0}")]
    ExecutionFailure(String),
    #[error("Result extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
    #[error("Sandbox returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Code generation failed: {0}")]
    GenerationError(String),
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error("Test case error: {0}")]
    TestCaseError(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        EvalError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::TransportError(err.to_string())
    }
}

// Failures of the `<<RESULT>>` output protocol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("output does not contain a result delimited by two <<RESULT>> markers")]
    MalformedResult,
    #[error("result payload is not valid JSON: {0}")]
    InvalidJson(String),
}
