//! Container snapshot and route types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single observed container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Container {
    /// Container name, used as the upstream host.
    pub name: String,

    /// Labels attached to the container.
    ///
    /// Kept sorted so every pass over the labels is deterministic.
    pub labels: BTreeMap<String, String>,

    /// Exposed ports.
    pub ports: Vec<Port>,
}

impl Container {
    /// Create a container with no labels or ports.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Add an exposed port.
    pub fn with_port(mut self, container_port: u16, host_port: u16) -> Self {
        self.ports.push(Port {
            container_port,
            host_port,
        });
        self
    }

    /// Look up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// An exposed container port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Port {
    /// Port inside the container.
    pub container_port: u16,

    /// Port bound on the host (0 = not bound).
    pub host_port: u16,
}

impl Port {
    /// Whether this port is published on the host.
    pub fn is_host_bound(&self) -> bool {
        self.host_port != 0
    }
}

/// One backend destination for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub name: String,
    /// Taken verbatim from the proxy label when present, so it is not
    /// range-checked as a TCP port.
    pub port: i64,
}

/// Routing rule for a single primary hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Primary hostname.
    pub primary: String,

    /// Alternative hostnames, as declared by the first container seen.
    pub alternatives: Vec<String>,

    /// Backends in discovery order.
    pub upstreams: Vec<Upstream>,

    /// Header replacements, ordered by header name.
    pub headers: BTreeMap<String, String>,
}

impl Route {
    /// Create an empty route.
    pub fn new(primary: impl Into<String>, alternatives: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            alternatives,
            upstreams: Vec::new(),
            headers: BTreeMap::new(),
        }
    }
}
