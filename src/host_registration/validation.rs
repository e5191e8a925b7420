use std::net::Ipv4Addr;

use crate::error_handling::types::HostsError;

/// Characters that may not appear in a hostname written to the hosts file.
pub const FORBIDDEN_SYMBOLS: &[char] = &[
    '!', '%', '[', ']', '{', '}', '_', ';', ':', '<', '>', '?', ',', '$', '#', '^', '*', '(',
    ')', '\'', '"', '`', '\\', '/',
];

pub fn validate_hostname(hostname: &str) -> Result<(), HostsError> {
    if hostname.is_empty() {
        return Err(HostsError::InvalidHostname("hostname is empty".to_string()));
    }
    if let Some(symbol) = hostname
        .chars()
        .find(|c| FORBIDDEN_SYMBOLS.contains(c) || c.is_whitespace() || c.is_control())
    {
        return Err(HostsError::InvalidHostname(format!(
            "{} contains forbidden symbol {:?}",
            hostname, symbol
        )));
    }
    Ok(())
}

/// Parses a dotted-quad IPv4 literal.
pub fn validate_address(address: &str) -> Result<Ipv4Addr, HostsError> {
    address
        .parse::<Ipv4Addr>()
        .map_err(|_| HostsError::InvalidAddress(address.to_string()))
}
