use serde_json::Value;
use std::path::PathBuf;

/// Outcome of one `ansible-playbook` invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub playbook: PathBuf,
    /// Process exit code; `None` when the process could not be run or was killed.
    pub exit_code: Option<i32>,
    /// Parsed JSON callback output, when stdout was valid JSON.
    pub output: Option<Value>,
    pub stderr: String,
    /// Failed tasks reported for the target host.
    pub failures: u64,
    /// Equivalent command line for running the playbook by hand.
    pub command: String,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && self.failures == 0
    }
}

/// Results of a batch, in execution order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<ExecutionResult>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.completed()
    }
}
