//! Selects a template transformer by language name and wraps generated code.
//!
//! Names are matched exactly. Mapping loose names such as `python` onto a
//! registered key is the caller's job.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::core_types::WrappedProgram;
use crate::errors::EvalError;
use crate::transformer::TemplateTransformer;

pub struct CodeWrapper {
    transformers: HashMap<String, TemplateTransformer>,
}

impl CodeWrapper {
    /// Wrapper with the `python3` and `javascript` transformers registered.
    pub fn new() -> Self {
        let mut wrapper = Self::empty();
        wrapper.register("python3", TemplateTransformer::Python3);
        wrapper.register("javascript", TemplateTransformer::JavaScript);
        wrapper
    }

    pub fn empty() -> Self {
        Self {
            transformers: HashMap::new(),
        }
    }

    pub fn register(&mut self, language: impl Into<String>, transformer: TemplateTransformer) {
        self.transformers.insert(language.into(), transformer);
    }

    pub fn transformer(&self, language: &str) -> Result<TemplateTransformer, EvalError> {
        self.transformers
            .get(language)
            .copied()
            .ok_or_else(|| EvalError::UnsupportedLanguage(language.to_string()))
    }

    pub fn wrap(
        &self,
        language: &str,
        code: &str,
        inputs: &Map<String, Value>,
    ) -> Result<WrappedProgram, EvalError> {
        let transformer = self.transformer(language)?;
        log::debug!("Wrapping {} code with {:?} transformer", language, transformer);
        transformer.transform_caller(code, inputs)
    }

    pub fn supported_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.transformers.keys().cloned().collect();
        languages.sort();
        languages
    }
}

impl Default for CodeWrapper {
    fn default() -> Self {
        Self::new()
    }
}
