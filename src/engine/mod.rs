//! Emulation engine capability.
//!
//! The topology core only talks to an [`EmulationEngine`]: create hosts and
//! links, start and stop the network, and run commands inside a host.
//!
//! - [`NetnsEngine`]: Linux network namespaces joined by veth pairs
//! - [`RecordingEngine`]: in-memory engine that records every call

pub mod netns;
pub mod recording;

pub use netns::NetnsEngine;
pub use recording::{EngineCall, RecordingEngine};

use crate::error::EngineError;

/// Attributes a host is registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub id: String,
    pub loopback: String,
    pub mac: String,
}

/// Opaque reference to a host created by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostHandle {
    id: String,
    slot: usize,
}

impl HostHandle {
    pub fn new(id: &str, slot: usize) -> Self {
        Self {
            id: id.to_string(),
            slot,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Engine-internal index of the host.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Operations the topology core needs from a network emulator.
///
/// Every call blocks until the engine is done with it, except
/// [`spawn_background`](EmulationEngine::spawn_background).
pub trait EmulationEngine {
    fn create_host(&mut self, spec: &HostSpec) -> Result<HostHandle, EngineError>;

    /// Connect two hosts. Each end gets the next free interface index of its host.
    fn create_link(&mut self, a: &HostHandle, b: &HostHandle) -> Result<(), EngineError>;

    fn start(&mut self) -> Result<(), EngineError>;

    fn stop(&mut self) -> Result<(), EngineError>;

    /// Run a shell command inside `host` and return its output.
    ///
    /// A command that runs and exits non-zero is not an error.
    fn execute(&mut self, host: &HostHandle, command: &str) -> Result<String, EngineError>;

    /// Launch a long-running command inside `host` without waiting for it.
    fn spawn_background(&mut self, host: &HostHandle, command: &str) -> Result<(), EngineError>;
}
