//! Packet capture management.
//!
//! The capture directory is reset once per run, before the first capture
//! starts. Captures run in the background inside their host.

use crate::commands;
use crate::engine::EmulationEngine;
use crate::error::{Result, TopologyError};
use crate::topology::{interface_name, Topology};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct CaptureManager {
    dir: PathBuf,
    ready: bool,
}

impl CaptureManager {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            ready: false,
        }
    }

    /// Remove the capture directory if present and recreate it empty.
    ///
    /// Only the first call per manager touches the filesystem.
    pub fn reset_capture_area(&mut self) -> Result<()> {
        if self.ready {
            debug!("capture directory {:?} already reset", self.dir);
            return Ok(());
        }

        let reset_err = |source| TopologyError::CaptureReset {
            path: self.dir.clone(),
            source,
        };
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir).map_err(reset_err)?;
        }
        fs::create_dir_all(&self.dir).map_err(reset_err)?;

        info!("Reset capture directory {:?}", self.dir);
        self.ready = true;
        Ok(())
    }

    /// Output file for one host interface.
    pub fn capture_file(&self, host: &str, interface: u32) -> PathBuf {
        self.dir.join(format!("{}-{}.pcap", host, interface))
    }

    /// Launch a capture on `<host>-eth<interface>` without waiting for it.
    pub fn start_capture(
        &self,
        engine: &mut dyn EmulationEngine,
        topology: &Topology,
        host: &str,
        interface: u32,
    ) -> Result<()> {
        if !self.ready {
            return Err(TopologyError::CaptureNotReady);
        }

        let handle = topology.handle(host, "capture request")?;
        let command =
            commands::start_capture(&interface_name(host, interface), &self.capture_file(host, interface));
        debug!("{}: {} &", host, command);
        engine
            .spawn_background(handle, &command)
            .map_err(|source| TopologyError::CommandExecutionFailed {
                host: host.to_string(),
                command,
                source,
            })
    }

    /// Reset the directory, then capture on every interface record.
    pub fn start_all(&mut self, engine: &mut dyn EmulationEngine, topology: &Topology) -> Result<()> {
        self.reset_capture_area()?;
        for link in topology.links() {
            self.start_capture(engine, topology, &link.host, link.interface)?;
        }
        info!("Started {} captures", topology.links().len());
        Ok(())
    }
}
