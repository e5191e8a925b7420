//! In-memory [`ContainerApi`] that records every call.

use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::api::ContainerApi;
use super::types::{
    ContainerState, ExecOutput, ImageRecord, InterfaceAddress, NetworkInterface, StateAction,
};
use crate::error_handling::types::ContainerError;

pub const FAKE_ADDRESS: &str = "10.161.0.42";

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    images: Vec<ImageRecord>,
    containers: HashSet<String>,
    state_polls: usize,
    start_failures: usize,
    pushed: HashMap<String, Vec<u8>>,
}

pub struct FakeApi {
    state: Mutex<FakeState>,
    /// Empty polls before the address shows up; `None` means never.
    polls_without_address: Option<usize>,
    /// Exit codes for commands containing the given text.
    failing_commands: Vec<(String, i64)>,
    fail_download: bool,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi {
            state: Mutex::new(FakeState::default()),
            polls_without_address: Some(0),
            failing_commands: Vec::new(),
            fail_download: false,
        }
    }

    pub fn with_image(self, os: &str, release: &str, fingerprint: &str) -> Self {
        self.lock().images.push(ImageRecord {
            os: os.to_string(),
            release: release.to_string(),
            architecture: "x86_64".to_string(),
            fingerprint: fingerprint.to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2020, 4, 1, 8, 0, 0).unwrap(),
        });
        self
    }

    pub fn with_container(self, name: &str) -> Self {
        self.lock().containers.insert(name.to_string());
        self
    }

    pub fn address_after(mut self, empty_polls: usize) -> Self {
        self.polls_without_address = Some(empty_polls);
        self
    }

    pub fn never_address(mut self) -> Self {
        self.polls_without_address = None;
        self
    }

    pub fn failing_starts(self, count: usize) -> Self {
        self.lock().start_failures = count;
        self
    }

    pub fn failing_command(mut self, fragment: &str, exit_code: i64) -> Self {
        self.failing_commands.push((fragment.to_string(), exit_code));
        self
    }

    pub fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn state_polls(&self) -> usize {
        self.lock().state_polls
    }

    pub fn pushed(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().pushed.get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }
}

impl ContainerApi for FakeApi {
    async fn list_images(&self) -> Result<Vec<ImageRecord>, ContainerError> {
        self.record("list_images".to_string());
        Ok(self.lock().images.clone())
    }

    async fn download_image(&self, server: &str, alias: &str) -> Result<(), ContainerError> {
        self.record(format!("download {} {}", server, alias));
        if self.fail_download {
            return Err(ContainerError::Api("image server unreachable".to_string()));
        }
        let (os, release) = alias.split_once('/').unwrap_or((alias, ""));
        let mut state = self.lock();
        let fingerprint = format!("downloaded-{}", state.images.len());
        state.images.push(ImageRecord {
            os: os.to_string(),
            release: release.to_string(),
            architecture: "x86_64".to_string(),
            fingerprint,
            uploaded_at: Utc::now(),
        });
        Ok(())
    }

    async fn container_exists(&self, name: &str) -> Result<bool, ContainerError> {
        self.record(format!("exists {}", name));
        Ok(self.lock().containers.contains(name))
    }

    async fn create_container(&self, name: &str, fingerprint: &str) -> Result<(), ContainerError> {
        self.record(format!("create {} {}", name, fingerprint));
        let mut state = self.lock();
        if !state.images.iter().any(|i| i.fingerprint == fingerprint) {
            return Err(ContainerError::Api("Image not found".to_string()));
        }
        state.containers.insert(name.to_string());
        Ok(())
    }

    async fn change_state(&self, name: &str, action: StateAction) -> Result<(), ContainerError> {
        self.record(format!("{} {}", action.as_str(), name));
        let mut state = self.lock();
        if action == StateAction::Start && state.start_failures > 0 {
            state.start_failures -= 1;
            return Err(ContainerError::Api("Failed to run: apparmor".to_string()));
        }
        Ok(())
    }

    async fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError> {
        self.record(format!("state {}", name));
        let mut state = self.lock();
        state.state_polls += 1;

        let ready = match self.polls_without_address {
            Some(empty) => state.state_polls > empty,
            None => false,
        };
        let mut addresses = vec![InterfaceAddress {
            family: "inet6".to_string(),
            address: "fe80::1".to_string(),
        }];
        if ready {
            addresses.push(InterfaceAddress {
                family: "inet".to_string(),
                address: FAKE_ADDRESS.to_string(),
            });
        }
        Ok(ContainerState {
            status: "Running".to_string(),
            network: Some(HashMap::from([(
                "eth0".to_string(),
                NetworkInterface { addresses },
            )])),
        })
    }

    async fn delete_container(&self, name: &str) -> Result<(), ContainerError> {
        self.record(format!("delete {}", name));
        self.lock().containers.remove(name);
        Ok(())
    }

    async fn exec(&self, name: &str, command: &[String]) -> Result<ExecOutput, ContainerError> {
        let line = command.last().cloned().unwrap_or_default();
        self.record(format!("exec {} {}", name, line));
        let exit_code = self
            .failing_commands
            .iter()
            .find(|(fragment, _)| line.contains(fragment.as_str()))
            .map(|(_, code)| *code)
            .unwrap_or(0);
        Ok(ExecOutput {
            exit_code,
            stdout: String::new(),
            stderr: if exit_code == 0 {
                String::new()
            } else {
                format!("{}: failed", line)
            },
        })
    }

    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        mode: u32,
    ) -> Result<(), ContainerError> {
        self.record(format!("push {} {} {:o}", name, path, mode));
        self.lock().pushed.insert(path.to_string(), content.to_vec());
        Ok(())
    }
}
