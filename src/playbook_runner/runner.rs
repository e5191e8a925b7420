use log::{debug, info, warn};
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::types::{BatchReport, ExecutionResult};
use crate::configuration::settings::AnsibleSettings;

/// Runs playbooks with `ansible-playbook` against the container.
///
/// The inventory is the single host given inline (`-i host,`), and the
/// connection settings are passed through `ANSIBLE_*` environment variables
/// so the user's own Ansible configuration keeps working otherwise.
pub struct PlaybookRunner {
    program: String,
    ssh_args: String,
}

impl PlaybookRunner {
    pub fn new(program: impl Into<String>, ssh_args: impl Into<String>) -> Self {
        PlaybookRunner {
            program: program.into(),
            ssh_args: ssh_args.into(),
        }
    }

    pub fn from_settings(settings: &AnsibleSettings) -> Self {
        Self::new(settings.program.clone(), settings.ssh_args.clone())
    }

    /// Shell command that reproduces a run of `playbook`.
    pub fn manual_command(&self, playbook: &Path, host: &str, private_key: &Path) -> String {
        format!(
            "ANSIBLE_SSH_ARGS='{}' {} -i {}, --private-key {} -u root {}",
            self.ssh_args,
            self.program,
            host,
            private_key.display(),
            playbook.display()
        )
    }

    /// Runs one playbook. Failures are reported in the result, never raised.
    pub async fn run_one(&self, playbook: &Path, host: &str, private_key: &Path) -> ExecutionResult {
        let command = self.manual_command(playbook, host, private_key);
        info!("Running playbook {}", playbook.display());
        debug!("{}", command);

        let mut result = ExecutionResult {
            playbook: playbook.to_path_buf(),
            exit_code: None,
            output: None,
            stderr: String::new(),
            failures: 0,
            command,
        };

        let output = Command::new(&self.program)
            .arg("-i")
            .arg(format!("{},", host))
            .arg(playbook)
            .env("ANSIBLE_SSH_ARGS", &self.ssh_args)
            .env("ANSIBLE_REMOTE_USER", "root")
            .env("ANSIBLE_PRIVATE_KEY_FILE", private_key)
            .env("ANSIBLE_HOST_KEY_CHECKING", "False")
            .env("ANSIBLE_STDOUT_CALLBACK", "json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                result.stderr = format!("unable to run {}: {}", self.program, e);
                warn!("{}\nTo run it manually:\n{}", result.stderr, result.command);
                return result;
            }
        };

        result.exit_code = output.status.code();
        result.stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            match serde_json::from_str::<Value>(&stdout) {
                Ok(parsed) => {
                    result.failures = host_failures(&parsed, host);
                    result.output = Some(parsed);
                }
                Err(e) => warn!("Unable to parse output of {}: {}", playbook.display(), e),
            }
        }

        if result.exit_code != Some(0) {
            warn!(
                "Playbook {} exited with {}:\n{}\nTo run it manually:\n{}",
                playbook.display(),
                output.status,
                result.stderr,
                result.command
            );
        } else if result.failures > 0 {
            warn!(
                "Playbook {} has {} failed tasks on {}\nTo run it manually:\n{}",
                playbook.display(),
                result.failures,
                host,
                result.command
            );
        } else {
            info!("Playbook {} completed", playbook.display());
        }
        result
    }

    /// Runs `playbooks` from `directory` one after another.
    pub async fn run_all(
        &self,
        directory: &Path,
        playbooks: &[String],
        host: &str,
        private_key: &Path,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for playbook in playbooks {
            let result = self.run_one(&directory.join(playbook), host, private_key).await;
            report.results.push(result);
        }
        info!(
            "Playbooks completed: {}, failed: {}",
            report.completed(),
            report.failed()
        );
        report
    }
}

/// `stats.<host>.failures` of the JSON callback output, 0 when absent.
fn host_failures(output: &Value, host: &str) -> u64 {
    output
        .get("stats")
        .and_then(|stats| stats.get(host))
        .and_then(|host_stats| host_stats.get("failures"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}
