//! Sign/verify self-test of an SSH key pair.
//!
//! A pair is authentic when a signature made with the private key over a
//! fixed payload verifies with the public key. Every failure along the way
//! (unparseable material, encrypted keys, non-RSA algorithms, a bad
//! signature) makes the pair invalid; none of them is an error.

use log::{debug, error, warn};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

const TEST_MESSAGE: &[u8] = b"testing keys";

/// Returns `true` when `private` and `public` form a matching RSA pair.
pub fn validate_pair(private: &[u8], public: &[u8]) -> bool {
    let private_key = match load_private_key(private) {
        Ok(key) => key,
        Err(reason) => {
            error!("Invalid private part of SSH key: {}", reason);
            return false;
        }
    };
    let public_key = match load_public_key(public) {
        Ok(key) => key,
        Err(reason) => {
            error!("Invalid public part of SSH key: {}", reason);
            return false;
        }
    };

    let digest = Sha256::digest(TEST_MESSAGE);
    let mut rng = rand::thread_rng();
    let signature = match private_key.sign_with_rng(&mut rng, Pss::new::<Sha256>(), &digest) {
        Ok(sig) => sig,
        Err(e) => {
            warn!("Unable to sign with the private key: {}", e);
            return false;
        }
    };

    match public_key.verify(Pss::new::<Sha256>(), &digest, &signature) {
        Ok(()) => {
            debug!("SSH key pair passed the signature check");
            true
        }
        Err(e) => {
            debug!("Signature verification failed: {}", e);
            false
        }
    }
}

/// Reads an RSA private key from PKCS#8 PEM, PKCS#1 PEM or unencrypted OpenSSH format.
pub fn load_private_key(content: &[u8]) -> Result<RsaPrivateKey, String> {
    let text = std::str::from_utf8(content).map_err(|_| "not a text key file".to_string())?;

    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(text) {
        return Ok(key);
    }
    if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(text) {
        return Ok(key);
    }
    if text.contains("ENCRYPTED PRIVATE KEY") {
        return Err("private key with password is not supported yet".to_string());
    }

    let openssh = ssh_key::PrivateKey::from_openssh(text).map_err(|e| e.to_string())?;
    if openssh.is_encrypted() {
        return Err("private key with password is not supported yet".to_string());
    }
    let keypair = openssh
        .key_data()
        .rsa()
        .ok_or_else(|| format!("unsupported algorithm {}", openssh.algorithm()))?;
    RsaPrivateKey::try_from(keypair).map_err(|e| e.to_string())
}

/// Reads an RSA public key from one OpenSSH `authorized_keys` line.
pub fn load_public_key(content: &[u8]) -> Result<RsaPublicKey, String> {
    let text = std::str::from_utf8(content).map_err(|_| "not a text key file".to_string())?;
    let public = ssh_key::PublicKey::from_openssh(text.trim()).map_err(|e| e.to_string())?;
    let rsa_key = public
        .key_data()
        .rsa()
        .ok_or_else(|| format!("unsupported algorithm {}", public.algorithm()))?;
    RsaPublicKey::try_from(rsa_key).map_err(|e| e.to_string())
}
