//! The evaluation loop.
//!
//! Each test case goes through generate → wrap → execute → compare. A failure
//! at any step is recorded on that case and the loop moves on; cases are
//! processed one after another in list order.

use crate::config::types::{EvalConfig, ModelConfig};
use crate::core_types::{CodeGenerationRequest, TestCase, TestResult};
use crate::errors::EvalError;
use crate::generator::CodeGenerator;
use crate::metrics::TestMetrics;
use crate::sandbox::CodeSandbox;
use crate::wrapper::CodeWrapper;

#[derive(Debug, Clone, Default)]
pub struct EvaluatorSettings {
    pub model_config: ModelConfig,
    pub no_variable: bool,
    pub enable_network: bool,
}

impl From<&EvalConfig> for EvaluatorSettings {
    fn from(config: &EvalConfig) -> Self {
        Self {
            model_config: config.model.clone(),
            no_variable: config.evaluation.no_variable,
            enable_network: config.sandbox.enable_network,
        }
    }
}

pub struct Evaluator {
    generator: Box<dyn CodeGenerator>,
    sandbox: Box<dyn CodeSandbox>,
    wrapper: CodeWrapper,
    settings: EvaluatorSettings,
}

impl Evaluator {
    pub fn new(
        generator: Box<dyn CodeGenerator>,
        sandbox: Box<dyn CodeSandbox>,
        settings: EvaluatorSettings,
    ) -> Self {
        Self {
            generator,
            sandbox,
            wrapper: CodeWrapper::new(),
            settings,
        }
    }

    pub fn with_wrapper(mut self, wrapper: CodeWrapper) -> Self {
        self.wrapper = wrapper;
        self
    }

    pub async fn run(&self, test_cases: &[TestCase]) -> TestMetrics {
        let mut metrics = TestMetrics::new();

        for (index, test_case) in test_cases.iter().enumerate() {
            log::info!(
                "Running test case {}/{}: {}",
                index + 1,
                test_cases.len(),
                test_case.name
            );
            let result = self.evaluate_case(test_case).await;
            metrics.add_result(result);
        }

        metrics.finish();
        metrics
    }

    pub async fn evaluate_case(&self, test_case: &TestCase) -> TestResult {
        match self.generate_and_execute(test_case).await {
            Ok(actual_value) => {
                let success = outputs_match(&actual_value, &test_case.ground_truth);
                if success {
                    log::info!("Test case '{}' passed", test_case.name);
                } else {
                    log::warn!(
                        "Test case '{}' failed: expected {}, got {}",
                        test_case.name,
                        test_case.ground_truth,
                        actual_value
                    );
                }
                TestResult {
                    test_case: test_case.clone(),
                    success,
                    actual_value,
                    error: None,
                }
            }
            Err(error) => {
                log::warn!("Test case '{}' failed: {}", test_case.name, error);
                TestResult::failed(test_case.clone(), error)
            }
        }
    }

    /// Runs steps 1-4 for one case and returns the extracted output.
    async fn generate_and_execute(&self, test_case: &TestCase) -> Result<String, EvalError> {
        let request = CodeGenerationRequest {
            instruction: test_case.instruction.clone(),
            code_language: test_case.code_language.clone(),
            no_variable: self.settings.no_variable,
            model_config: self.settings.model_config.clone(),
        };
        let generated = self.generator.generate(&request).await?;

        let requested = if generated.language.trim().is_empty() {
            &test_case.code_language
        } else {
            &generated.language
        };
        let language = normalize_language(requested);
        log::debug!("Generated {} code for '{}'", language, test_case.name);

        let program = self.wrapper.wrap(&language, &generated.code, &test_case.inputs)?;

        let execution = self
            .sandbox
            .execute(&program, self.settings.enable_network)
            .await?;

        if let Some(error) = execution.error {
            return Err(error);
        }
        if execution.status_code != 200 {
            return Err(EvalError::UnexpectedStatus {
                status: execution.status_code,
                body: execution.body,
            });
        }

        Ok(execution.body)
    }
}

/// Maps generator language names onto transformer keys.
pub fn normalize_language(language: &str) -> String {
    let language = language.trim().to_lowercase();
    match language.as_str() {
        "python" => "python3".to_string(),
        _ => language,
    }
}

/// Drops every space and newline character.
pub fn normalize_output(output: &str) -> String {
    output.chars().filter(|c| *c != ' ' && *c != '\n').collect()
}

pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}
