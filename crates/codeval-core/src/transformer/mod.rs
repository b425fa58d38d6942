//! Runner scaffolds that turn a generated `main` function into a standalone
//! program.
//!
//! Every variant supplies a scaffold with a `{{code}}` and an `{{inputs}}`
//! placeholder. The scaffold decodes base64 JSON inputs, calls `main` with
//! them and prints the JSON return value between two `<<RESULT>>` markers.
//! Encoding and substitution are shared by all variants.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::core_types::WrappedProgram;
use crate::errors::EvalError;

mod javascript;
mod python3;

pub const CODE_PLACEHOLDER: &str = "{{code}}";
pub const INPUTS_PLACEHOLDER: &str = "{{inputs}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateTransformer {
    Python3,
    JavaScript,
}

impl TemplateTransformer {
    pub fn runner_script(&self) -> &'static str {
        match self {
            TemplateTransformer::Python3 => python3::RUNNER_SCRIPT,
            TemplateTransformer::JavaScript => javascript::RUNNER_SCRIPT,
        }
    }

    /// Setup code the sandbox runs before the runner. Empty for the built-in
    /// variants.
    pub fn preload_script(&self) -> &'static str {
        match self {
            TemplateTransformer::Python3 | TemplateTransformer::JavaScript => "",
        }
    }

    /// Name of the runtime the sandbox backend uses for this variant.
    pub fn runtime_language(&self) -> &'static str {
        match self {
            TemplateTransformer::Python3 => "python3",
            TemplateTransformer::JavaScript => "nodejs",
        }
    }

    pub fn transform_caller(
        &self,
        code: &str,
        inputs: &Map<String, Value>,
    ) -> Result<WrappedProgram, EvalError> {
        let encoded_inputs = encode_inputs(inputs)?;

        let final_code = self
            .runner_script()
            .replace(CODE_PLACEHOLDER, code)
            .replace(INPUTS_PLACEHOLDER, &encoded_inputs);

        Ok(WrappedProgram {
            language: self.runtime_language().to_string(),
            final_code,
            preload_script: self.preload_script().to_string(),
        })
    }
}

/// Compact JSON in insertion order, then standard padded base64.
pub fn encode_inputs(inputs: &Map<String, Value>) -> Result<String, EvalError> {
    let json = serde_json::to_vec(inputs).map_err(|e| EvalError::EncodingError(e.to_string()))?;
    Ok(STANDARD.encode(json))
}
