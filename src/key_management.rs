//! SSH key management subsystem.
//!
//! Re-exports:
//! - [`KeyManager`]: resolves (validates or generates) the key pair of a run.
//! - [`KeyPair`], [`KeyResolution`]: core types.

pub mod generator;
pub mod key_manager;
pub mod types;
pub mod validation;

pub use key_manager::KeyManager;
pub use types::{KeyPair, KeyResolution};
pub use validation::validate_pair;
