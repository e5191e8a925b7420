//! Minimal model of the static hosts file (`/etc/hosts` format).

use log::debug;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use super::validation::{validate_address, validate_hostname};
use crate::error_handling::types::HostsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsEntry {
    pub address: String,
    pub names: Vec<String>,
}

/// Entries of a hosts file. Comments and blank lines are skipped.
pub fn parse_hosts(content: &str) -> Vec<HostsEntry> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or_default();
            let mut fields = line.split_whitespace();
            let address = fields.next()?;
            let names: Vec<String> = fields.map(str::to_string).collect();
            if names.is_empty() {
                return None;
            }
            Some(HostsEntry {
                address: address.to_string(),
                names,
            })
        })
        .collect()
}

/// Whether some line maps `address` to `hostname`.
pub fn contains_pair(content: &str, hostname: &str, address: &str) -> bool {
    parse_hosts(content)
        .iter()
        .any(|entry| entry.address == address && entry.names.iter().any(|n| n == hostname))
}

/// Current content of `path`; a missing file reads as empty.
pub fn read_hosts(path: &Path) -> Result<String, HostsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(HostsError::IoError(e)),
    }
}

/// Appends `address hostname` to the hosts file at `path`.
///
/// Fails with [`HostsError::Conflict`] when the pair is already present, in
/// which case the file is left untouched.
pub fn register_host(hostname: &str, address: &str, path: &Path) -> Result<(), HostsError> {
    validate_hostname(hostname)?;
    let address = validate_address(address)?.to_string();

    let content = read_hosts(path)?;
    if contains_pair(&content, hostname, &address) {
        return Err(HostsError::Conflict(format!(
            "{} {} already exists in {}",
            address,
            hostname,
            path.display()
        )));
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if !content.is_empty() && !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{}\t{}", address, hostname)?;
    file.sync_all()?;

    debug!("Added {} {} to {}", address, hostname, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "127.0.0.1\tlocalhost\n# comment line\n::1 localhost ip6-localhost\n10.0.0.5 web01 web01.lab # inline\n";

    #[test]
    fn parse_skips_comments() {
        let entries = parse_hosts(SAMPLE);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].address, "10.0.0.5");
        assert_eq!(entries[2].names, vec!["web01", "web01.lab"]);
    }

    #[test]
    fn pair_lookup_requires_both_parts() {
        assert!(contains_pair(SAMPLE, "web01.lab", "10.0.0.5"));
        assert!(!contains_pair(SAMPLE, "web01", "10.0.0.6"));
        assert!(!contains_pair(SAMPLE, "inline", "10.0.0.5"));
    }

    #[test]
    fn register_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "127.0.0.1 localhost").unwrap();

        register_host("quiet-lynx", "10.161.0.42", &path).unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();

        let err = register_host("quiet-lynx", "10.161.0.42", &path).unwrap_err();
        assert!(matches!(err, HostsError::Conflict(_)));

        let after_second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after_first, after_second);
        assert_eq!(after_second, "127.0.0.1 localhost\n10.161.0.42\tquiet-lynx\n");
        assert_eq!(
            parse_hosts(&after_second)
                .iter()
                .filter(|e| e.names.contains(&"quiet-lynx".to_string()))
                .count(),
            1
        );
    }

    #[test]
    fn register_creates_missing_file_and_validates_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");

        assert!(matches!(
            register_host("bad_name", "10.0.0.1", &path),
            Err(HostsError::InvalidHostname(_))
        ));
        assert!(matches!(
            register_host("good", "999.1.1.1", &path),
            Err(HostsError::InvalidAddress(_))
        ));
        assert!(!path.exists());

        register_host("good", "10.0.0.1", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10.0.0.1\tgood\n");
    }

    #[test]
    fn unwritable_location_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("hosts");
        assert!(matches!(
            register_host("good", "10.0.0.1", &path),
            Err(HostsError::IoError(_))
        ));
    }
}
