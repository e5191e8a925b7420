//! Host registration subsystem.
//!
//! Re-exports:
//! - [`HostRegistrar`]: confirms, escalates and runs the hosts-file helper.
//! - [`register_host`]: the idempotent append performed by the helper.
//! - [`validate_hostname`], [`validate_address`]: input checks shared by both sides.

pub mod helper;
pub mod hosts_file;
pub mod registrar;
pub mod validation;

pub use hosts_file::register_host;
pub use registrar::{HostRegistrar, Privilege, Registration};
pub use validation::{validate_address, validate_hostname};
