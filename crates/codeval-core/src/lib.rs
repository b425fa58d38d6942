//! Evaluation pipeline for an automated code-generation service.
//!
//! Generated functions are wrapped into runnable programs, executed in a
//! remote sandbox, and their tagged output is compared against known answers.
//!
//! # Architecture Overview
//!
//! - **Template transformers**: per-language runner scaffolds plus the shared
//!   encode-and-substitute step
//! - **Code wrapper**: picks a transformer by language name
//! - **Sandbox client**: submits wrapped programs to the execution backend
//! - **Result extractor**: reads the `<<RESULT>>`-delimited JSON from stdout
//! - **Evaluator and metrics**: drive the per-case loop and tally outcomes
//! - **Collaborators**: console login, code generation, test-case loading and
//!   configuration

pub mod auth;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod evaluator;
pub mod extractor;
pub mod generator;
pub mod metrics;
pub mod sandbox;
pub mod test_cases;
pub mod transformer;
pub mod wrapper;

pub use auth::ConsoleAuthClient;
pub use config::*;
pub use core_types::{ExecutionResult, TestCase, TestResult, WrappedProgram};
pub use errors::{EvalError, ExtractError};
pub use evaluator::{Evaluator, EvaluatorSettings};
pub use generator::{CodeGenerator, ConsoleCodeGenerator};
pub use metrics::TestMetrics;
pub use sandbox::{CodeSandbox, SandboxClient};
pub use test_cases::TestCaseLoader;
pub use transformer::TemplateTransformer;
pub use wrapper::CodeWrapper;

#[cfg(test)]
pub mod test_utils;
