//! Privileged side of host registration.
//!
//! Runs as `lazy-lxd-fill-hosts`, normally through `sudo`, so the main
//! process never writes the hosts file itself.

use clap::Parser;
use std::path::PathBuf;

use super::hosts_file::register_host;
use super::validation::{validate_address, validate_hostname};
use crate::error_handling::types::HostsError;

/// Exit status of the helper on success.
pub const EXIT_ADDED: i32 = 0;
/// Exit status when the pair exists or the file could not be written.
pub const EXIT_FAILED: i32 = 1;

/// Arguments of `lazy-lxd-fill-hosts`.
///
/// # Command Line
/// `lazy-lxd-fill-hosts <hostname> <ip> <hosts-file>`
#[derive(Parser, Debug, Clone)]
#[command(name = "lazy-lxd-fill-hosts")]
#[command(version)]
#[command(about = "Append one address/hostname pair to a hosts file")]
pub struct HelperArgs {
    /// Hostname to register
    #[arg(value_parser = parse_hostname)]
    pub hostname: String,

    /// IPv4 address of the host
    #[arg(value_parser = parse_address)]
    pub ip: String,

    /// Hosts file to update
    pub hosts_file: PathBuf,
}

fn parse_hostname(value: &str) -> Result<String, String> {
    validate_hostname(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}

fn parse_address(value: &str) -> Result<String, String> {
    validate_address(value)
        .map(|ip| ip.to_string())
        .map_err(|e| e.to_string())
}

/// Performs the registration and returns the process exit status.
pub fn run(args: &HelperArgs) -> i32 {
    match register_host(&args.hostname, &args.ip, &args.hosts_file) {
        Ok(()) => EXIT_ADDED,
        Err(HostsError::Conflict(message)) => {
            eprintln!("Conflict: {}", message);
            EXIT_FAILED
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_FAILED
        }
    }
}
