use log::{debug, info, warn};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::hosts_file::{contains_pair, read_hosts};
use super::validation::validate_hostname;
use crate::error_handling::types::{HostsError, PromptError};
use crate::prompt::{password_with, Prompter};

/// Number of sudo password attempts before giving up.
pub const SUDO_ATTEMPTS: usize = 3;

/// How the helper gets write access to the hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privilege {
    /// Already root: the helper runs directly.
    Root,
    /// The helper runs through this `sudo` program, password on stdin.
    Sudo(PathBuf),
}

impl Privilege {
    pub fn detect() -> Self {
        if is_running_as_root() {
            Privilege::Root
        } else {
            Privilege::Sudo(PathBuf::from("sudo"))
        }
    }
}

/// Outcome of [`HostRegistrar::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The exact pair was already in the file; nothing was written.
    AlreadyPresent,
    /// The user chose not to touch the hosts file.
    Skipped,
}

impl Registration {
    /// Whether the hostname now resolves to the container.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, Registration::Skipped)
    }
}

/// Registers the container hostname in the hosts file.
///
/// The file itself is written by the `lazy-lxd-fill-hosts` helper, started
/// under `sudo` unless the current user is already root.
pub struct HostRegistrar {
    helper: PathBuf,
    hosts_file: PathBuf,
    privilege: Privilege,
}

impl HostRegistrar {
    pub fn new(helper: impl Into<PathBuf>, hosts_file: impl Into<PathBuf>) -> Self {
        HostRegistrar {
            helper: helper.into(),
            hosts_file: hosts_file.into(),
            privilege: Privilege::detect(),
        }
    }

    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = privilege;
        self
    }

    pub async fn register<P: Prompter + ?Sized>(
        &self,
        prompter: &P,
        hostname: &str,
        address: Ipv4Addr,
    ) -> Result<Registration, HostsError> {
        validate_hostname(hostname)?;
        let address = address.to_string();

        let current = read_hosts(&self.hosts_file)?;
        if contains_pair(&current, hostname, &address) {
            warn!(
                "Conflict: {} {} already exists in {}",
                address,
                hostname,
                self.hosts_file.display()
            );
            return Ok(Registration::AlreadyPresent);
        }

        info!(
            "Adding {} to {} requires superuser privileges",
            hostname,
            self.hosts_file.display()
        );
        let question = format!("Add {} {} to {}", address, hostname, self.hosts_file.display());
        if !prompter.confirm(&question, true)? {
            warn!("Hostname {} was not registered", hostname);
            return Ok(Registration::Skipped);
        }

        let password = match &self.privilege {
            Privilege::Root => None,
            Privilege::Sudo(sudo) => Some(ask_sudo_password(prompter, sudo)?),
        };

        self.run_helper(hostname, &address, password.as_deref()).await?;
        info!("{} was added to {}", hostname, self.hosts_file.display());
        Ok(Registration::Added)
    }

    async fn run_helper(
        &self,
        hostname: &str,
        address: &str,
        password: Option<&str>,
    ) -> Result<(), HostsError> {
        let mut command = match (&self.privilege, password) {
            (Privilege::Sudo(sudo), Some(_)) => {
                let mut command = Command::new(sudo);
                command.args(["-S", "-p", ""]).arg(&self.helper);
                command
            }
            _ => Command::new(&self.helper),
        };
        command
            .arg(hostname)
            .arg(address)
            .arg(&self.hosts_file)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            "Running {} {} {} {}",
            self.helper.display(),
            hostname,
            address,
            self.hosts_file.display()
        );
        let mut child = command
            .spawn()
            .map_err(|e| HostsError::HelperFailed(format!("{}: {}", self.helper.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(password) = password {
                // sudo with cached credentials may never read its input
                let line = format!("{}\n", password);
                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                    debug!("Helper input not consumed: {}", e);
                }
            }
        }

        let output = child.wait_with_output().await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(HostsError::HelperFailed(if stderr.is_empty() {
            format!("helper exited with {}", output.status)
        } else {
            stderr
        }))
    }
}

fn ask_sudo_password<P: Prompter + ?Sized>(prompter: &P, sudo: &Path) -> Result<String, HostsError> {
    password_with(prompter, "Password for sudo", SUDO_ATTEMPTS, |candidate| {
        if check_sudo_password(sudo, candidate) {
            Ok(())
        } else {
            Err("Authentication failure".to_string())
        }
    })
    .map_err(|e| match e {
        PromptError::TooManyAttempts(_) => HostsError::AuthenticationFailed,
        other => HostsError::Prompt(other),
    })
}

/// Whether `password` unlocks sudo, ignoring any cached credentials.
pub fn check_sudo_password(sudo: &Path, password: &str) -> bool {
    let child = std::process::Command::new(sudo)
        .args(["-S", "-k", "-p", "", "id", "-u"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            debug!("Unable to run {}: {}", sudo.display(), e);
            return false;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        if writeln!(stdin, "{}", password).is_err() {
            debug!("sudo closed its input early");
        }
    }

    let checked = child
        .wait_with_output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    debug!("sudo password check result: {}", checked);
    checked
}

/// Best-effort check for root privileges (EUID == 0).
pub fn is_running_as_root() -> bool {
    let is_root = std::process::Command::new("id")
        .arg("-u")
        .output()
        .map(|output| {
            output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "0"
        })
        .unwrap_or(false);

    debug!("Root privilege check result: {}", is_root);
    is_root
}
