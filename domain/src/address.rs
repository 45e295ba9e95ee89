//! Syntactic SSRF classification of hostnames and IP literals.
//!
//! Only the literal host string is inspected. No DNS lookups happen here, so a
//! public name that later resolves to a private address is not caught.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Internal and cloud-metadata hostnames refused outright.
pub const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
    "broadcasthost",
    "metadata",
    "metadata.google.internal",
    "metadata.goog",
    "metadata.azure.com",
    "instance-data",
    "instance-data.ec2.internal",
    "kubernetes.default",
    "kubernetes.default.svc",
];

/// Internal-looking top-level labels.
pub const BLOCKED_SUFFIXES: &[&str] = &[
    ".local",
    ".internal",
    ".localhost",
    ".lan",
    ".corp",
    ".intranet",
];

/// Refused IPv4 networks as (network, prefix length).
const BLOCKED_V4: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    // CGNAT
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

fn in_network(addr: u32, network: u32, prefix: u8) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    addr & mask == network & mask
}

/// True if the IPv4 address falls in any refused network.
pub fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let addr = u32::from(ip);
    BLOCKED_V4
        .iter()
        .any(|(net, prefix)| in_network(addr, u32::from(*net), *prefix))
}

/// True for loopback, unspecified, unique-local, link-local and multicast
/// IPv6 addresses. IPv4-mapped addresses are judged by their IPv4 part.
pub fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip == Ipv6Addr::LOCALHOST
        || ip == Ipv6Addr::UNSPECIFIED
        // fc00::/7
        || first & 0xfe00 == 0xfc00
        // fe80::/10
        || first & 0xffc0 == 0xfe80
        // ff00::/8
        || first & 0xff00 == 0xff00
}

/// Decide whether a hostname or IP literal must be refused as a redirect target.
///
/// Accepts bracketed IPv6 literals and any run of trailing root dots; a host
/// made only of dots is refused. Rules apply in order: exact names, internal
/// suffixes, IPv4 ranges, IPv6 ranges. Anything else is an ordinary DNS name
/// and passes.
pub fn is_blocked_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return true;
    }

    if BLOCKED_HOSTS.contains(&host.as_str()) {
        return true;
    }
    if BLOCKED_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        return true;
    }
    if let Ok(v4) = host.parse::<Ipv4Addr>() {
        return is_blocked_ipv4(v4);
    }
    if host.contains(':') {
        // Unparseable colon-bearing hosts fail closed
        return host.parse::<Ipv6Addr>().map_or(true, is_blocked_ipv6);
    }
    false
}
