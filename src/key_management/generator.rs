use log::{debug, error, warn};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::types::KeyPair;
use crate::error_handling::types::KeyError;

pub const KEY_BITS: usize = 2048;
pub const PUBLIC_KEY_SUFFIX: &str = ".pub";

pub fn generate_rsa() -> Result<RsaPrivateKey, KeyError> {
    let mut rng = rand::thread_rng();
    RsaPrivateKey::new(&mut rng, KEY_BITS).map_err(|e| KeyError::GenerationFailed(e.to_string()))
}

/// PKCS#8 PEM, unencrypted.
pub fn encode_private_key(key: &RsaPrivateKey) -> Result<String, KeyError> {
    key.to_pkcs8_pem(LineEnding::LF)
        .map(|pem| pem.to_string())
        .map_err(|e| KeyError::EncodingFailed(e.to_string()))
}

/// One OpenSSH `authorized_keys` line.
pub fn encode_public_key(key: &RsaPrivateKey, comment: &str) -> Result<String, KeyError> {
    let public = RsaPublicKey::from(key);
    let key_data = ssh_key::public::RsaPublicKey::try_from(&public)
        .map_err(|e| KeyError::EncodingFailed(e.to_string()))?;
    let openssh = ssh_key::PublicKey::new(ssh_key::public::KeyData::Rsa(key_data), comment);
    openssh
        .to_openssh()
        .map(|line| format!("{}\n", line))
        .map_err(|e| KeyError::EncodingFailed(e.to_string()))
}

/// Generates a key pair and stores it as `<ssh_dir>/<name>` and `<ssh_dir>/<name>.pub`.
///
/// The directory is not created: a missing `ssh_dir` is a write failure.
/// Existing files are never replaced; if either path is taken nothing is written.
pub fn create_key_pair(ssh_dir: &Path, name: &str) -> Result<KeyPair, KeyError> {
    debug!("Generating {}-bit RSA key pair {}", KEY_BITS, name);
    let key = generate_rsa()?;
    let private_key = encode_private_key(&key)?.into_bytes();
    let public_key = encode_public_key(&key, &format!("lazy-lxd@{}", name))?.into_bytes();

    let private_key_path = ssh_dir.join(name);
    let public_key_path = ssh_dir.join(format!("{}{}", name, PUBLIC_KEY_SUFFIX));
    for path in [&private_key_path, &public_key_path] {
        if path.exists() {
            warn!("Refusing to overwrite existing file {}", path.display());
            return Err(KeyError::WriteFailed(format!("{}: file already exists", path.display())));
        }
    }
    debug!("Saving keys into {}", ssh_dir.display());

    write_key_file(&private_key_path, &private_key, 0o600)?;
    write_key_file(&public_key_path, &public_key, 0o644)?;

    Ok(KeyPair {
        private_key_path,
        public_key_path,
        private_key,
        public_key,
        generated: true,
    })
}

fn write_key_file(path: &Path, content: &[u8], mode: u32) -> Result<(), KeyError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
        .map_err(|e| {
            error!("Failed to create key file {}: {}", path.display(), e);
            KeyError::WriteFailed(format!("{}: {}", path.display(), e))
        })?;
    file.write_all(content)
        .map_err(|e| KeyError::WriteFailed(format!("{}: {}", path.display(), e)))?;

    // the umask may have masked bits off mode()
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| KeyError::WriteFailed(format!("{}: {}", path.display(), e)))?;
    Ok(())
}
