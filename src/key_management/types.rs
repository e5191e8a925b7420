//! Core types of the key management subsystem.

use std::path::PathBuf;

/// SSH key pair usable for provisioning a container.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    /// Private key file content.
    pub private_key: Vec<u8>,
    /// Public key file content (one OpenSSH line).
    pub public_key: Vec<u8>,
    /// `true` when the pair was generated during this run.
    pub generated: bool,
}

/// Outcome of key resolution.
#[derive(Debug, Clone)]
pub enum KeyResolution {
    /// A pair that passed the sign/verify self-test, or a freshly generated one.
    Ready(KeyPair),
    /// No usable pair and the user declined to create one: SSH provisioning is skipped.
    Disabled,
}

impl KeyResolution {
    pub fn is_disabled(&self) -> bool {
        matches!(self, KeyResolution::Disabled)
    }

    pub fn key_pair(&self) -> Option<&KeyPair> {
        match self {
            KeyResolution::Ready(pair) => Some(pair),
            KeyResolution::Disabled => None,
        }
    }
}
