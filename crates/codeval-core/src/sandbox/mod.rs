//! Remote execution of wrapped programs.
//!
//! The sandbox is an external service. `CodeSandbox` is the seam the
//! evaluator talks to; `SandboxClient` is the HTTP implementation.

use async_trait::async_trait;

use crate::core_types::{ExecutionResult, WrappedProgram};
use crate::errors::EvalError;

pub mod client;

pub use client::{SandboxClient, SANDBOX_REQUEST_TIMEOUT, SANDBOX_RUN_PATH};

#[async_trait]
pub trait CodeSandbox: Send + Sync {
    /// `Err` only for transport failures. Failures of the program itself are
    /// reported through `ExecutionResult::error`.
    async fn execute(
        &self,
        program: &WrappedProgram,
        enable_network: bool,
    ) -> Result<ExecutionResult, EvalError>;
}
