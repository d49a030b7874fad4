//! Container label parsing.
//!
//! # Label Table
//! | label                        | required | meaning                                   |
//! |------------------------------|----------|-------------------------------------------|
//! | `com.chameth.vhost`          | yes      | hostnames, separated by commas or spaces  |
//! | `com.chameth.proxy`          | no       | upstream port (signed 64-bit integer)     |
//! | `com.chameth.headers.<any>`  | no       | `name: value` header replacement          |
//! | `com.chameth.proxytag`       | no       | matched against the configured proxy tag  |
//!
//! Malformed labels never produce errors: an unparseable port falls back to
//! auto-detection and a header without a colon is skipped.

use std::collections::BTreeMap;

use crate::builder::types::Container;

pub const LABEL_VHOST: &str = "com.chameth.vhost";
pub const LABEL_PROXY: &str = "com.chameth.proxy";
pub const LABEL_HEADERS: &str = "com.chameth.headers";
pub const LABEL_PROXYTAG: &str = "com.chameth.proxytag";

/// Split a vhost label into the primary hostname and its alternatives.
///
/// Returns `None` if the label holds no hostnames at all.
pub fn parse_vhosts(vhost: &str) -> Option<(String, Vec<String>)> {
    let mut parts = vhost
        .split([',', ' '])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string);

    let primary = parts.next()?;
    Some((primary, parts.collect()))
}

/// Resolve the upstream port for a container.
///
/// An explicit proxy label wins if it parses as a signed integer; the value
/// is used as-is, without a port range check. Otherwise the container must
/// expose exactly one port that is not bound to the host.
pub fn parse_port(container: &Container) -> Option<i64> {
    if let Some(port) = container
        .label(LABEL_PROXY)
        .and_then(|value| value.parse::<i64>().ok())
    {
        return Some(port);
    }

    let mut unbound = container.ports.iter().filter(|port| !port.is_host_bound());
    match (unbound.next(), unbound.next()) {
        (Some(port), None) => Some(i64::from(port.container_port)),
        _ => None,
    }
}

/// Collect header replacements from `com.chameth.headers.*` labels.
pub fn parse_headers(container: &Container) -> BTreeMap<String, String> {
    let prefix = format!("{LABEL_HEADERS}.");

    container
        .labels
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .filter_map(|(_, value)| value.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Whether a container carries a vhost and resolves to a port.
pub fn should_proxy(container: &Container) -> bool {
    match container.label(LABEL_VHOST) {
        Some(vhost) if !vhost.is_empty() => parse_port(container).is_some(),
        _ => false,
    }
}
