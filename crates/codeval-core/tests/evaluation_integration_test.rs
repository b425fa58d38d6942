use async_trait::async_trait;
use codeval_core::config::types::ModelConfig;
use codeval_core::core_types::{
    CodeGenerationRequest, ExecutionResult, GeneratedCode, TestCase, WrappedProgram,
};
use codeval_core::errors::{EvalError, ExtractError};
use codeval_core::evaluator::{Evaluator, EvaluatorSettings};
use codeval_core::generator::CodeGenerator;
use codeval_core::sandbox::{CodeSandbox, SandboxClient};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Result<GeneratedCode, EvalError>>>>,
    requests: Arc<Mutex<Vec<CodeGenerationRequest>>>,
}

impl MockGenerator {
    fn new(responses: Vec<Result<GeneratedCode, EvalError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    async fn generate(&self, request: &CodeGenerationRequest) -> Result<GeneratedCode, EvalError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EvalError::GenerationError("no scripted response".to_string())))
    }
}

/// Answers with sandbox envelopes, run through the real response handling.
#[derive(Clone, Default)]
struct MockSandbox {
    envelopes: Arc<Mutex<VecDeque<Result<Value, EvalError>>>>,
    programs: Arc<Mutex<Vec<(WrappedProgram, bool)>>>,
}

impl MockSandbox {
    fn new(envelopes: Vec<Result<Value, EvalError>>) -> Self {
        Self {
            envelopes: Arc::new(Mutex::new(VecDeque::from(envelopes))),
            programs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> usize {
        self.programs.lock().unwrap().len()
    }
}

#[async_trait]
impl CodeSandbox for MockSandbox {
    async fn execute(
        &self,
        program: &WrappedProgram,
        enable_network: bool,
    ) -> Result<ExecutionResult, EvalError> {
        self.programs
            .lock()
            .unwrap()
            .push((program.clone(), enable_network));
        let envelope = self
            .envelopes
            .lock()
            .unwrap()
            .pop_front()
            .expect("sandbox called more often than scripted")?;
        Ok(SandboxClient::interpret_response(&envelope.to_string()))
    }
}

fn stdout(stdout: &str) -> Result<Value, EvalError> {
    Ok(json!({"code": 0, "message": "success", "data": {"error": "", "stdout": stdout}}))
}

fn program_error(error: &str) -> Result<Value, EvalError> {
    Ok(json!({"code": 0, "message": "success", "data": {"error": error, "stdout": ""}}))
}

fn generated(code: &str, language: &str) -> Result<GeneratedCode, EvalError> {
    Ok(GeneratedCode {
        code: code.to_string(),
        language: language.to_string(),
        error: String::new(),
    })
}

fn case(name: &str, inputs: Value, language: &str, ground_truth: &str) -> TestCase {
    let inputs = match inputs {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    TestCase {
        name: name.to_string(),
        inputs,
        instruction: format!("instruction for {}", name),
        code_language: language.to_string(),
        ground_truth: ground_truth.to_string(),
    }
}

fn settings() -> EvaluatorSettings {
    EvaluatorSettings {
        model_config: ModelConfig {
            provider: "openai".to_string(),
            name: "gpt-4o".to_string(),
            ..Default::default()
        },
        no_variable: false,
        enable_network: true,
    }
}

fn decode_python_inputs(code: &str) -> Value {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let prefix = "b64decode('";
    let start = code.find(prefix).unwrap() + prefix.len();
    let end = start + code[start..].find('\'').unwrap();
    serde_json::from_slice(&STANDARD.decode(&code[start..end]).unwrap()).unwrap()
}

#[tokio::test]
async fn test_successful_python_case() {
    let generator = MockGenerator::new(vec![generated("def main(a,b): return a+b", "python")]);
    let sandbox = MockSandbox::new(vec![stdout("<<RESULT>>3<<RESULT>>\n")]);
    let evaluator = Evaluator::new(
        Box::new(generator.clone()),
        Box::new(sandbox.clone()),
        settings(),
    );

    let metrics = evaluator
        .run(&[case("add", json!({"a": 1, "b": 2}), "python", "3")])
        .await;

    assert_eq!(metrics.total(), 1);
    assert_eq!(metrics.successful(), 1);
    let result = &metrics.results()[0];
    assert!(result.success);
    assert_eq!(result.actual_value, "3");
    assert!(result.error.is_none());

    let programs = sandbox.programs.lock().unwrap();
    let (program, enable_network) = &programs[0];
    assert_eq!(program.language, "python3");
    assert!(enable_network);
    assert!(program.final_code.contains("def main(a,b): return a+b"));
    assert_eq!(decode_python_inputs(&program.final_code), json!({"a": 1, "b": 2}));

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests[0].instruction, "instruction for add");
    assert_eq!(requests[0].code_language, "python");
    assert_eq!(requests[0].model_config.name, "gpt-4o");
}

#[tokio::test]
async fn test_program_error_is_recorded_without_comparison() {
    let generator = MockGenerator::new(vec![generated("def main(: pass", "python")]);
    let sandbox = MockSandbox::new(vec![program_error("SyntaxError")]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(sandbox), settings());

    let metrics = evaluator
        .run(&[case("broken", json!({}), "python", "3")])
        .await;

    let result = &metrics.results()[0];
    assert!(!result.success);
    assert_eq!(
        result.error,
        Some(EvalError::ExecutionFailure("SyntaxError".to_string()))
    );
    assert!(result.actual_value.is_empty());
    assert_eq!(metrics.failed(), 1);
}

#[tokio::test]
async fn test_single_marker_is_a_malformed_result() {
    let generator = MockGenerator::new(vec![generated("def main(): return 3", "python")]);
    let sandbox = MockSandbox::new(vec![stdout("<<RESULT>>3\n")]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(sandbox), settings());

    let metrics = evaluator.run(&[case("half", json!({}), "python", "3")]).await;

    assert_eq!(
        metrics.results()[0].error,
        Some(EvalError::Extraction(ExtractError::MalformedResult))
    );
}

#[tokio::test]
async fn test_unsupported_language_never_reaches_the_sandbox() {
    let generator = MockGenerator::new(vec![generated("def main; 3; end", "ruby")]);
    let sandbox = MockSandbox::new(vec![]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(sandbox.clone()), settings());

    let metrics = evaluator.run(&[case("rb", json!({}), "ruby", "3")]).await;

    assert_eq!(
        metrics.results()[0].error,
        Some(EvalError::UnsupportedLanguage("ruby".to_string()))
    );
    assert_eq!(sandbox.calls(), 0);
}

#[tokio::test]
async fn test_every_case_runs_after_failures() {
    let generator = MockGenerator::new(vec![
        Err(EvalError::GenerationError("model unavailable".to_string())),
        generated("def main(): return 1", "python"),
        generated("function main({x}) { return x }", "javascript"),
        generated("def main(): return [1, 2]", ""),
        generated("def main(): return 5", "python"),
    ]);
    let sandbox = MockSandbox::new(vec![
        Err(EvalError::TransportError("timed out".to_string())),
        stdout("<<RESULT>>{\"x\": \"y\"}<<RESULT>>"),
        stdout("<<RESULT>>[\n    1,\n    2\n]<<RESULT>>"),
        stdout("<<RESULT>>4<<RESULT>>"),
    ]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(sandbox.clone()), settings());

    let cases = vec![
        case("gen-fails", json!({}), "python", "1"),
        case("transport-fails", json!({}), "python", "1"),
        case("js-object", json!({"x": "y"}), "javascript", "{\"x\":\"y\"}"),
        case("fallback-language", json!({}), "python", "[1, 2]"),
        case("mismatch", json!({}), "python", "5"),
    ];
    let metrics = evaluator.run(&cases).await;

    assert_eq!(metrics.total(), 5);
    assert_eq!(metrics.successful(), 2);
    assert_eq!(metrics.failed(), 3);
    assert_eq!(metrics.total(), metrics.results().len());
    assert!(metrics.end_time.is_some());

    let results = metrics.results();
    let names: Vec<&str> = results.iter().map(|r| r.test_case.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["gen-fails", "transport-fails", "js-object", "fallback-language", "mismatch"]
    );

    assert!(matches!(results[0].error, Some(EvalError::GenerationError(_))));
    assert!(matches!(results[1].error, Some(EvalError::TransportError(_))));
    assert!(results[2].success);
    assert!(results[3].success);
    assert!(!results[4].success);
    assert!(results[4].error.is_none());
    assert_eq!(results[4].actual_value, "4");

    let programs = sandbox.programs.lock().unwrap();
    assert_eq!(programs.len(), 4);
    assert_eq!(programs[1].0.language, "nodejs");
    assert_eq!(programs[2].0.language, "python3");

    let report = metrics.to_string();
    assert!(report.contains("FAIL mismatch: expected 5, got 4"));
    assert!(report.contains("Accuracy: 40.00%"));
}

#[tokio::test]
async fn test_non_200_status_is_a_failure() {
    struct BusySandbox;

    #[async_trait]
    impl CodeSandbox for BusySandbox {
        async fn execute(
            &self,
            _program: &WrappedProgram,
            _enable_network: bool,
        ) -> Result<ExecutionResult, EvalError> {
            Ok(ExecutionResult {
                status_code: 503,
                body: "busy".to_string(),
                error: None,
            })
        }
    }

    let generator = MockGenerator::new(vec![generated("def main(): return 1", "python")]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(BusySandbox), settings());

    let metrics = evaluator.run(&[case("busy", json!({}), "python", "1")]).await;
    assert_eq!(
        metrics.results()[0].error,
        Some(EvalError::UnexpectedStatus {
            status: 503,
            body: "busy".to_string()
        })
    );
}

#[tokio::test]
async fn test_empty_case_list() {
    let evaluator = Evaluator::new(
        Box::new(MockGenerator::default()),
        Box::new(MockSandbox::default()),
        settings(),
    );

    let metrics = evaluator.run(&[]).await;
    assert_eq!(metrics.total(), 0);
    assert!(metrics.accuracy().is_nan());
    assert!(metrics.to_string().contains("Accuracy: n/a"));
}

#[tokio::test]
async fn test_custom_wrapper_adds_a_language_alias() {
    use codeval_core::transformer::TemplateTransformer;
    use codeval_core::wrapper::CodeWrapper;

    let mut wrapper = CodeWrapper::new();
    wrapper.register("nodejs", TemplateTransformer::JavaScript);

    let generator = MockGenerator::new(vec![
        generated("function main({n}) { return n * 2 }", "nodejs"),
        generated("function main({n}) { return n * 2 }", "nodejs"),
    ]);
    let sandbox = MockSandbox::new(vec![stdout("<<RESULT>>4<<RESULT>>")]);

    let with_alias = Evaluator::new(
        Box::new(generator.clone()),
        Box::new(sandbox.clone()),
        settings(),
    )
    .with_wrapper(wrapper);
    let metrics = with_alias.run(&[case("double", json!({"n": 2}), "nodejs", "4")]).await;
    assert!(metrics.results()[0].success);
    assert_eq!(sandbox.programs.lock().unwrap()[0].0.language, "nodejs");

    let default_wrapper = Evaluator::new(Box::new(generator), Box::new(sandbox.clone()), settings());
    let metrics = default_wrapper
        .run(&[case("double", json!({"n": 2}), "nodejs", "4")])
        .await;
    assert_eq!(
        metrics.results()[0].error,
        Some(EvalError::UnsupportedLanguage("nodejs".to_string()))
    );
    assert_eq!(sandbox.calls(), 1);
}

#[tokio::test]
async fn test_key_order_and_integral_floats_do_not_affect_comparison() {
    let generator = MockGenerator::new(vec![
        generated("def main(words): return {w: len(w) for w in words}", "python"),
        generated("def main(): return 6 / 2", "python"),
    ]);
    let sandbox = MockSandbox::new(vec![
        stdout("<<RESULT>>{\"rust\": 4, \"is\": 2, \"fun\": 3}<<RESULT>>"),
        stdout("<<RESULT>>3.0<<RESULT>>"),
    ]);
    let evaluator = Evaluator::new(Box::new(generator), Box::new(sandbox), settings());

    let cases = vec![
        case(
            "word_lengths",
            json!({"words": ["rust", "is", "fun"]}),
            "python",
            "{\"fun\": 3, \"is\": 2, \"rust\": 4}",
        ),
        case("divide", json!({}), "python", "3"),
    ];
    let metrics = evaluator.run(&cases).await;

    assert_eq!(metrics.successful(), 2);
    assert_eq!(metrics.results()[1].actual_value, "3");
}
