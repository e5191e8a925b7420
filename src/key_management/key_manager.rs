use log::{debug, error, warn};
use std::path::{Path, PathBuf};

use super::generator::{create_key_pair, PUBLIC_KEY_SUFFIX};
use super::types::{KeyPair, KeyResolution};
use super::validation::validate_pair;
use crate::error_handling::types::{ConfigError, KeyError};
use crate::prompt::Prompter;

/// Suffix of public keys written by earlier releases of the tool.
pub const LEGACY_PUBLIC_KEY_SUFFIX: &str = "-cert.pub";

/// Obtains the SSH key pair used to reach the container.
///
/// Existing keys given on the command line are checked with a sign/verify
/// round trip. When no valid pair is available the user may have one
/// generated under `ssh_dir`, named after the container.
pub struct KeyManager {
    ssh_dir: PathBuf,
}

impl KeyManager {
    pub fn new(ssh_dir: impl Into<PathBuf>) -> Self {
        Self {
            ssh_dir: ssh_dir.into(),
        }
    }

    /// Uses `~/.ssh` of the current user.
    pub fn from_home() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
        Ok(Self::new(home.join(".ssh")))
    }

    /// Resolves the key pair for this run.
    ///
    /// Invalid or incomplete keys are not fatal: the user is offered to
    /// generate a pair, and declining disables SSH provisioning. Only a
    /// failure to save generated keys is an error.
    pub fn resolve_keys<P: Prompter + ?Sized>(
        &self,
        prompter: &P,
        private_key: Option<&Path>,
        public_key: Option<&Path>,
        container_name: &str,
    ) -> Result<KeyResolution, KeyError> {
        if let Some(pair) = self.existing_pair(private_key, public_key) {
            return Ok(KeyResolution::Ready(pair));
        }

        let create = prompter.confirm(
            "Create new SSH key pair\n  Will be named by name of container.",
            true,
        )?;
        if !create {
            warn!("SSH was disabled because there are no keys.\nWill be create container only.");
            return Ok(KeyResolution::Disabled);
        }

        debug!("Creating SSH keys by name {}", container_name);
        let pair = create_key_pair(&self.ssh_dir, container_name)?;
        Ok(KeyResolution::Ready(pair))
    }

    /// Reads and checks the pair given on the command line, if any.
    fn existing_pair(&self, private_key: Option<&Path>, public_key: Option<&Path>) -> Option<KeyPair> {
        let private_key_path = private_key?.to_path_buf();
        let public_key_path = match public_key {
            Some(path) => path.to_path_buf(),
            None => match search_public_key(&private_key_path) {
                Some(path) => {
                    debug!("Found public part of SSH key {}", path.display());
                    path
                }
                None => {
                    error!(
                        "Public part of SSH key is not found next to {}",
                        private_key_path.display()
                    );
                    return None;
                }
            },
        };

        let private_content = read_key(&private_key_path)?;
        let public_content = read_key(&public_key_path)?;

        if !validate_pair(&private_content, &public_content) {
            error!("Keys pair has invalid signature.");
            return None;
        }

        Some(KeyPair {
            private_key_path,
            public_key_path,
            private_key: private_content,
            public_key: public_content,
            generated: false,
        })
    }
}

fn read_key(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(content) => Some(content),
        Err(e) => {
            error!("Unable to read SSH key {}: {}", path.display(), e);
            None
        }
    }
}

/// Looks for the public key next to `private_key`: `<key>.pub`, then `<key>-cert.pub`.
pub fn search_public_key(private_key: &Path) -> Option<PathBuf> {
    [PUBLIC_KEY_SUFFIX, LEGACY_PUBLIC_KEY_SUFFIX]
        .iter()
        .map(|suffix| {
            let mut name = private_key.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        })
        .inspect(|candidate| debug!("Looking for ssh public key by path {}", candidate.display()))
        .find(|candidate| candidate.is_file())
}
