//! OS release resolution.
//!
//! Ubuntu releases are canonicalized to their codename through a fixed
//! version table, so `18.04` and `bionic` select the same image. CentOS
//! releases are plain version numbers.

use crate::configuration::types::OsFamily;
use crate::error_handling::types::ConfigError;

/// Ubuntu numeric versions and their codenames.
pub const UBUNTU_RELEASES: [(&str, &str); 5] = [
    ("14.04", "trusty"),
    ("16.04", "xenial"),
    ("18.04", "bionic"),
    ("19.10", "eoan"),
    ("20.04", "focal"),
];

pub const DEFAULT_UBUNTU_RELEASE: &str = "bionic";
pub const DEFAULT_CENTOS_RELEASE: &str = "8";

/// Returns the canonical release for `os`, falling back to the family default.
pub fn resolve_release(os: OsFamily, release: Option<&str>) -> Result<String, ConfigError> {
    let release = release.map(str::trim).filter(|r| !r.is_empty());

    match os {
        OsFamily::Ubuntu => match release {
            None => Ok(DEFAULT_UBUNTU_RELEASE.to_string()),
            Some(value) => resolve_ubuntu(value),
        },
        OsFamily::Centos => match release {
            None => Ok(DEFAULT_CENTOS_RELEASE.to_string()),
            Some(value) if is_numeric_version(value) => Ok(value.to_string()),
            Some(value) => Err(ConfigError::UnsupportedRelease(format!(
                "{} {} (expected a numeric version such as {})",
                os.display_name(),
                value,
                DEFAULT_CENTOS_RELEASE
            ))),
        },
    }
}

fn resolve_ubuntu(value: &str) -> Result<String, ConfigError> {
    let lowered = value.to_lowercase();
    if let Some((_, codename)) = UBUNTU_RELEASES
        .iter()
        .find(|(number, codename)| *number == lowered || *codename == lowered)
    {
        return Ok(codename.to_string());
    }

    if lowered.chars().all(|c| c.is_ascii_alphabetic()) {
        // newer codenames are not in the table; the image lookup decides
        return Ok(lowered);
    }

    let known: Vec<&str> = UBUNTU_RELEASES.iter().map(|(number, _)| *number).collect();
    Err(ConfigError::UnsupportedRelease(format!(
        "Ubuntu {} (known versions: {})",
        value,
        known.join(", ")
    )))
}

fn is_numeric_version(value: &str) -> bool {
    value.split('.').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
