//! Per-host configuration steps.
//!
//! - [`host`]: forwarding and address assignment
//! - [`capture`]: capture directory reset and per-interface capture
//! - [`routes`]: static route installation

pub mod capture;
pub mod host;
pub mod routes;

pub use capture::CaptureManager;
pub use host::{configure_addresses, configure_forwarding, configure_hosts};
pub use routes::{install_routes, validate_path_hosts, validate_paths};

use crate::engine::{EmulationEngine, HostHandle};
use crate::error::{Result, TopologyError};
use log::debug;

/// Execute one command on a host, wrapping engine failures with the host and command.
pub(crate) fn run(
    engine: &mut dyn EmulationEngine,
    host: &HostHandle,
    command: &str,
) -> Result<String> {
    debug!("{}: {}", host.id(), command);
    engine
        .execute(host, command)
        .map_err(|source| TopologyError::CommandExecutionFailed {
            host: host.id().to_string(),
            command: command.to_string(),
            source,
        })
}
