//! Loads the ordered list of test cases for a run.
//!
//! Files ending in `.json` are read as JSON; anything else is read as YAML.
//! Either way the top level is a sequence of test case records.

use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

use crate::core_types::TestCase;
use crate::errors::EvalError;

pub struct TestCaseLoader;

impl TestCaseLoader {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TestCase>, EvalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            EvalError::TestCaseError(format!(
                "Failed to read test case file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let cases = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        log::info!("Loaded {} test cases from {}", cases.len(), path.display());
        Ok(cases)
    }

    pub fn from_yaml_str(content: &str) -> Result<Vec<TestCase>, EvalError> {
        let cases: Vec<TestCase> = serde_yaml::from_str(content)
            .map_err(|e| EvalError::TestCaseError(format!("Failed to parse YAML test cases: {}", e)))?;
        Self::validate(&cases)?;
        Ok(cases)
    }

    pub fn from_json_str(content: &str) -> Result<Vec<TestCase>, EvalError> {
        let cases: Vec<TestCase> = serde_json::from_str(content)
            .map_err(|e| EvalError::TestCaseError(format!("Failed to parse JSON test cases: {}", e)))?;
        Self::validate(&cases)?;
        Ok(cases)
    }

    fn validate(cases: &[TestCase]) -> Result<(), EvalError> {
        let mut seen = HashSet::new();
        for (index, case) in cases.iter().enumerate() {
            if case.name.trim().is_empty() {
                return Err(EvalError::TestCaseError(format!(
                    "Test case #{} has an empty name",
                    index + 1
                )));
            }
            if !seen.insert(case.name.as_str()) {
                log::warn!("Duplicate test case name '{}'", case.name);
            }
        }
        Ok(())
    }
}
