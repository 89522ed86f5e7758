//! # Topolab - Emulated network builder
//!
//! Builds an emulated multi-host network from three plain-text files and
//! configures every host before handing over to an interactive session.
//!
//! ## Input Files
//!
//! One record per line, fields separated by whitespace, blank lines ignored:
//!
//! ```text
//! # loopbacks: <nodeId> <loopbackAddress>
//! 1 fc00::1/128
//! # links: <nodeId> <peerId> <interfaceIndex> <linkAddress> <loopbackOfPeer>
//! 1 2 0 fc00:12::1/64 fc00::2/128
//! # paths: <nodeId> <interfaceIndex> <gatewayAddress> <destinationAddress>
//! 1 0 fc00:12::2 fc00::2/128
//! ```
//!
//! ## Architecture
//!
//! - `config_loader`: parsing of the three input files
//! - `config`: run-wide settings, optionally loaded from YAML
//! - `topology`: record types, edge deduplication, host/link registration
//! - `engine`: the [`EmulationEngine`](engine::EmulationEngine) capability,
//!   a network-namespace implementation and a recording implementation
//! - `commands`: command text for forwarding, addressing, routes and capture
//! - `setup`: per-host forwarding and addressing, capture, static routes
//! - `session`: interactive inspection session
//! - `orchestrator`: sequencing of a full run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use topolab::config::RunConfig;
//! use topolab::engine::RecordingEngine;
//! use topolab::orchestrator;
//!
//! let config = RunConfig { interactive: false, ..RunConfig::default() };
//! let mut engine = RecordingEngine::new();
//! orchestrator::run(&config, &mut engine, std::io::empty(), std::io::sink())?;
//!
//! for (host, command) in engine.executed() {
//!     println!("{host}: {command}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`error::TopologyError`]; the binary reports
//! them through `color_eyre`.

pub mod commands;
pub mod config;
pub mod config_loader;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod setup;
pub mod topology;
