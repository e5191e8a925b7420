use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error_handling::types::ConfigError;

/// Operating system family of the container image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lower")]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Ubuntu,
    Centos,
}

impl OsFamily {
    /// Identifier used by the image server and by image properties.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::Centos => "centos",
        }
    }

    /// Capitalized name for human-facing output.
    pub fn display_name(&self) -> &'static str {
        match self {
            OsFamily::Ubuntu => "Ubuntu",
            OsFamily::Centos => "Centos",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the LXD daemon REST API is reached.
#[derive(Debug, Clone, PartialEq)]
pub enum LxdEndpoint {
    /// Local daemon through its unix socket.
    UnixSocket(PathBuf),
    /// Remote daemon over HTTPS, authenticated with a trusted client certificate.
    Https {
        url: String,
        client_cert: Option<PathBuf>,
        client_key: Option<PathBuf>,
        accept_invalid_certs: bool,
    },
}

impl LxdEndpoint {
    /// Parses an endpoint string: a socket path, a `unix://` URL or an `https://` URL.
    pub fn parse(
        raw: &str,
        client_cert: Option<PathBuf>,
        client_key: Option<PathBuf>,
        accept_invalid_certs: bool,
    ) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if let Some(path) = raw.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(ConfigError::InvalidEndpoint(raw.to_string()));
            }
            return Ok(LxdEndpoint::UnixSocket(PathBuf::from(path)));
        }
        if raw.starts_with('/') {
            return Ok(LxdEndpoint::UnixSocket(PathBuf::from(raw)));
        }
        if raw.starts_with("https://") {
            return Ok(LxdEndpoint::Https {
                url: raw.trim_end_matches('/').to_string(),
                client_cert,
                client_key,
                accept_invalid_certs,
            });
        }
        Err(ConfigError::InvalidEndpoint(format!(
            "{} (expected a socket path, unix:// or https:// URL)",
            raw
        )))
    }

    /// Local socket location, honouring `LXD_DIR` and snap installations.
    pub fn default_socket() -> Self {
        if let Ok(dir) = std::env::var("LXD_DIR") {
            if !dir.is_empty() {
                return LxdEndpoint::UnixSocket(PathBuf::from(dir).join("unix.socket"));
            }
        }
        let snap = PathBuf::from("/var/snap/lxd/common/lxd/unix.socket");
        if snap.exists() {
            return LxdEndpoint::UnixSocket(snap);
        }
        LxdEndpoint::UnixSocket(PathBuf::from("/var/lib/lxd/unix.socket"))
    }
}

impl fmt::Display for LxdEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LxdEndpoint::UnixSocket(path) => write!(f, "unix://{}", path.display()),
            LxdEndpoint::Https { url, .. } => write!(f, "{}", url),
        }
    }
}
