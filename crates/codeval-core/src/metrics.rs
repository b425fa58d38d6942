//! Accumulates per-case outcomes and renders the run summary.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::core_types::TestResult;

#[derive(Debug, Clone)]
pub struct TestMetrics {
    total: usize,
    successful: usize,
    failed: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    results: Vec<TestResult>,
}

impl TestMetrics {
    pub fn new() -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            start_time: Utc::now(),
            end_time: None,
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: TestResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Percentage of successful cases. NaN for an empty run.
    pub fn accuracy(&self) -> f64 {
        self.successful as f64 / self.total as f64 * 100.0
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    pub fn summarize(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.results.iter().map(result_line).collect();

        let accuracy = if self.total == 0 {
            "n/a".to_string()
        } else {
            format!("{:.2}%", self.accuracy())
        };

        lines.push(String::new());
        lines.push("Test Summary:".to_string());
        lines.push(format!("Total: {}", self.total));
        lines.push(format!("Successful: {}", self.successful));
        lines.push(format!("Failed: {}", self.failed));
        lines.push(format!("Accuracy: {}", accuracy));
        lines.push(format!("Elapsed: {:.2}s", self.elapsed_seconds()));
        lines
    }
}

fn result_line(result: &TestResult) -> String {
    let name = &result.test_case.name;
    if result.success {
        return format!("PASS {}", name);
    }
    match &result.error {
        Some(error) => format!("FAIL {}: {}", name, error),
        None => format!(
            "FAIL {}: expected {}, got {}",
            name, result.test_case.ground_truth, result.actual_value
        ),
    }
}

impl Default for TestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TestMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summarize().join("\n"))
    }
}
