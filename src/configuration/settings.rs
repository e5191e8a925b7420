//! Settings file support.
//!
//! Everything that is not a per-run choice lives in an optional TOML file,
//! by default `<config_dir>/lazy-lxd/config.toml`. Every key has a default,
//! so a missing file or a partial file are both fine:
//!
//! ```toml
//! [lxd]
//! endpoint = "https://lxd.example:8443"
//! client_cert = "/home/me/.config/lxc/client.crt"
//! client_key = "/home/me/.config/lxc/client.key"
//!
//! [network]
//! timeout_secs = 60
//!
//! [hosts]
//! file = "/etc/hosts"
//! ```

use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::LxdEndpoint;
use crate::error_handling::types::ConfigError;

pub const DEFAULT_IMAGE_SERVER: &str = "https://images.linuxcontainers.org";
pub const DEFAULT_SSH_ARGS: &str =
    "-o IdentitiesOnly=yes -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null";
pub const HOSTS_HELPER_NAME: &str = "lazy-lxd-fill-hosts";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub lxd: LxdSettings,
    pub network: NetworkSettings,
    pub hosts: HostsSettings,
    pub ansible: AnsibleSettings,
    pub programs: ProgramSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LxdSettings {
    /// Socket path, `unix://` or `https://` URL. Unset means the local socket.
    pub endpoint: Option<String>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    /// Simplestreams server images are downloaded from.
    pub image_server: String,
    /// Upper bound for one asynchronous daemon operation (image download included).
    pub operation_timeout_secs: u64,
}

impl Default for LxdSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            client_cert: None,
            client_key: None,
            accept_invalid_certs: false,
            image_server: DEFAULT_IMAGE_SERVER.to_string(),
            operation_timeout_secs: 600,
        }
    }
}

impl LxdSettings {
    pub fn endpoint(&self) -> Result<LxdEndpoint, ConfigError> {
        match &self.endpoint {
            Some(raw) => LxdEndpoint::parse(
                raw,
                self.client_cert.clone(),
                self.client_key.clone(),
                self.accept_invalid_certs,
            ),
            None => Ok(LxdEndpoint::default_socket()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_interval_secs: 1,
        }
    }
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostsSettings {
    pub file: PathBuf,
    /// Privileged helper binary. Unset means the one shipped next to this executable.
    pub helper: Option<PathBuf>,
}

impl Default for HostsSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("/etc/hosts"),
            helper: None,
        }
    }
}

impl HostsSettings {
    pub fn helper_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(helper) = &self.helper {
            return Ok(helper.clone());
        }
        let exe = std::env::current_exe()?;
        Ok(exe.with_file_name(HOSTS_HELPER_NAME))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnsibleSettings {
    pub program: String,
    pub ssh_args: String,
}

impl Default for AnsibleSettings {
    fn default() -> Self {
        Self {
            program: "ansible-playbook".to_string(),
            ssh_args: DEFAULT_SSH_ARGS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramSettings {
    pub required: Vec<String>,
    pub recommended: Vec<String>,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            required: vec!["lxc".to_string(), "lxd".to_string()],
            recommended: vec!["ansible".to_string(), "ansible-playbook".to_string()],
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Reads settings from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads an explicitly requested file (must exist) or the default one (may be absent).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lazy-lxd").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.network.timeout(), Duration::from_secs(30));
        assert_eq!(settings.network.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.hosts.file, PathBuf::from("/etc/hosts"));
        assert_eq!(settings.lxd.image_server, DEFAULT_IMAGE_SERVER);
        assert_eq!(settings.ansible.program, "ansible-playbook");
        assert_eq!(settings.programs.required, vec!["lxc", "lxd"]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [lxd]
            endpoint = "https://10.0.0.2:8443"
            accept_invalid_certs = true

            [network]
            timeout_secs = 45
            "#,
        )
        .unwrap();

        assert_eq!(settings.network.timeout_secs, 45);
        assert_eq!(settings.network.poll_interval_secs, 1);
        assert_eq!(settings.hosts.file, PathBuf::from("/etc/hosts"));
        match settings.lxd.endpoint().unwrap() {
            LxdEndpoint::Https {
                url,
                accept_invalid_certs,
                ..
            } => {
                assert_eq!(url, "https://10.0.0.2:8443");
                assert!(accept_invalid_certs);
            }
            other => panic!("unexpected endpoint {:?}", other),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::from_toml("[network]\ntimeout = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn explicit_file_is_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[hosts]\nfile = \"/tmp/hosts\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.hosts.file, PathBuf::from("/tmp/hosts"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/lazy-lxd.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let settings = Settings::from_toml("[network]\npoll_interval_secs = 0\n").unwrap();
        assert_eq!(settings.network.poll_interval(), Duration::from_secs(1));
    }
}
