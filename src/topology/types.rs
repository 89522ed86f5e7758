//! Topology type definitions.
//!
//! Plain records parsed from the loopback, link and path files, plus the
//! undirected [`Edge`] used to deduplicate links.

use std::fmt;

/// An emulated host as declared in the loopback file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    /// Loopback address with prefix length, e.g. `fc00::1/128`
    pub loopback: String,
}

/// One side of a physical link, as declared in the link file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub host: String,
    pub peer: String,
    /// N-th interface of `host`
    pub interface: u32,
    /// Address with prefix length assigned on that interface
    pub address: String,
    pub peer_loopback: String,
}

impl LinkConfig {
    /// Name of the interface this record configures.
    pub fn interface_name(&self) -> String {
        interface_name(&self.host, self.interface)
    }
}

/// A static route, as declared in the path file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    pub host: String,
    pub interface: u32,
    pub gateway: String,
    pub destination: String,
}

/// Interface naming shared by the engine and the command builders.
pub fn interface_name(host: &str, interface: u32) -> String {
    format!("{}-eth{}", host, interface)
}

/// Address family used for every address and route command of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    #[default]
    Ipv6,
}

impl AddressFamily {
    pub fn from_ipv4_flag(use_ipv4: bool) -> Self {
        if use_ipv4 {
            Self::Ipv4
        } else {
            Self::Ipv6
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => write!(f, "IPv4"),
            Self::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// Unordered pair of host ids. `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    low: String,
    high: String,
}

impl Edge {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    /// The other endpoint, if `id` is one of them.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.low == id {
            Some(&self.high)
        } else if self.high == id {
            Some(&self.low)
        } else {
            None
        }
    }
}
