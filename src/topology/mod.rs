//! Network topology module.
//!
//! Record types parsed from the input files, the undirected edge set, and
//! the builder that registers hosts and links with the emulation engine.

pub mod builder;
pub mod types;

pub use builder::{build, derive_mac, dump_connections, validate_links, HostEntry, Topology};
pub use types::{interface_name, AddressFamily, Edge, LinkConfig, Node, PathConfig};
