//! Core types used by the container management subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Image known to the daemon, as needed for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub os: String,
    pub release: String,
    pub architecture: String,
    pub fingerprint: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Lifecycle of the container created by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Created,
    Running,
    Stopped,
    Deleted,
}

/// Handle describing the container managed by this run.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    /// Container name, unique on the daemon.
    pub name: String,
    /// Fingerprint of the image the container was created from.
    pub fingerprint: String,
    pub status: ContainerStatus,
    /// IPv4 address of `eth0`, once observed.
    pub address: Option<Ipv4Addr>,
}

impl ContainerHandle {
    pub fn new(name: &str, fingerprint: &str) -> Self {
        ContainerHandle {
            name: name.to_string(),
            fingerprint: fingerprint.to_string(),
            status: ContainerStatus::Created,
            address: None,
        }
    }
}

/// State change requested through the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Start,
    Stop,
}

impl StateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateAction::Start => "start",
            StateAction::Stop => "stop",
        }
    }
}

/// Runtime state reported by the daemon.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub network: Option<HashMap<String, NetworkInterface>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkInterface {
    #[serde(default)]
    pub addresses: Vec<InterfaceAddress>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterfaceAddress {
    pub family: String,
    pub address: String,
}

impl ContainerState {
    /// First IPv4 address of `eth0`, if the interface has one.
    pub fn eth0_ipv4(&self) -> Option<Ipv4Addr> {
        self.network
            .as_ref()?
            .get("eth0")?
            .addresses
            .iter()
            .filter(|a| a.family == "inet")
            .find_map(|a| a.address.parse().ok())
    }
}

/// Captured result of a command executed inside the container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutput {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}
