//! Run orchestration.
//!
//! Sequences loading, topology construction, host configuration, capture,
//! route installation and the interactive session against one engine.

use crate::config::RunConfig;
use crate::config_loader::{load_inputs, InputTables};
use crate::engine::EmulationEngine;
use crate::error::{Result, TopologyError};
use crate::session::run_session;
use crate::setup::{configure_hosts, install_routes, validate_path_hosts, CaptureManager};
use crate::topology::{self, Topology};
use log::{info, warn};
use std::io::{BufRead, Write};

/// Build and configure the network described by `inputs`.
///
/// Every reference is validated before the first engine call. Hosts are
/// fully configured before the first route is installed.
pub fn configure(
    config: &RunConfig,
    engine: &mut dyn EmulationEngine,
    inputs: &InputTables,
) -> Result<Topology> {
    topology::validate_links(&inputs.nodes, &inputs.links)?;
    validate_path_hosts(&inputs.nodes, &inputs.paths)?;

    let topology = topology::build(engine, &inputs.nodes, &inputs.links)?;
    engine.start()?;
    topology::dump_connections(&topology);

    let family = config.family();
    configure_hosts(engine, &topology, family)?;

    if config.trace_enabled {
        let mut capture = CaptureManager::new(&config.capture_dir);
        capture.start_all(engine, &topology)?;
    }

    install_routes(engine, &topology, &inputs.paths, family)?;
    info!("Network configured");
    Ok(topology)
}

/// Load, configure, run the session if enabled, then tear the network down.
///
/// The network is stopped even when configuration fails after it started;
/// the first error wins.
pub fn run<R: BufRead, W: Write>(
    config: &RunConfig,
    engine: &mut dyn EmulationEngine,
    input: R,
    output: W,
) -> Result<Topology> {
    info!("Using {} addressing", config.family());
    let inputs = load_inputs(config)?;

    let outcome = configure(config, engine, &inputs).and_then(|topology| {
        if config.interactive {
            run_session(engine, &topology, input, output).map_err(TopologyError::Session)?;
        }
        Ok(topology)
    });

    match (outcome, engine.stop()) {
        (Ok(topology), Ok(())) => Ok(topology),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), stop) => {
            if let Err(stop_err) = stop {
                warn!("Teardown after failure also failed: {}", stop_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_loader::{parse_links, parse_nodes, parse_paths};
    use crate::engine::{EngineCall, RecordingEngine};

    fn inputs(nodes: &str, links: &str, paths: &str) -> InputTables {
        InputTables {
            nodes: parse_nodes("loopbacks", nodes).unwrap(),
            links: parse_links("links", links).unwrap(),
            paths: parse_paths("paths", paths).unwrap(),
        }
    }

    #[test]
    fn test_unknown_path_host_before_engine() {
        let mut engine = RecordingEngine::new();
        let tables = inputs("A 10.0.0.1/32\n", "", "Z 0 10.0.0.2 10.0.0.9/32\n");

        let err = configure(&RunConfig::default(), &mut engine, &tables).unwrap_err();

        assert!(matches!(
            err,
            TopologyError::UnknownNodeReference { ref id, ref context } if id == "Z" && context == "path record 1"
        ));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_start_precedes_configuration() {
        let mut engine = RecordingEngine::new();
        let tables = inputs(
            "A 10.0.0.1/32\nB 10.0.0.2/32\n",
            "A B 0 10.0.0.5/30 10.0.0.2/32\nB A 0 10.0.0.6/30 10.0.0.1/32\n",
            "A 0 10.0.0.6 10.0.0.2/32\n",
        );

        configure(&RunConfig::default(), &mut engine, &tables).unwrap();

        let start = engine.calls().iter().position(|c| *c == EngineCall::Start).unwrap();
        let first_exec = engine
            .calls()
            .iter()
            .position(|c| matches!(c, EngineCall::Execute { .. }))
            .unwrap();
        assert!(start < first_exec);
        assert_eq!(
            engine.executed().last(),
            Some(&("A", "ip -6 route add 10.0.0.2/32 via 10.0.0.6"))
        );
    }

    #[test]
    fn test_failure_still_stops_engine() {
        let mut engine = RecordingEngine::new().fail_on("route");
        let tmp = tempfile::TempDir::new().unwrap();
        let write = |name: &str, text: &str| {
            let path = tmp.path().join(name);
            std::fs::write(&path, text).unwrap();
            path
        };
        let config = RunConfig {
            loopbacks_file: write("loopbacks.txt", "A 10.0.0.1/32\n"),
            links_file: write("links.txt", ""),
            paths_file: write("paths.txt", "A 0 10.0.0.6 10.0.0.2/32\n"),
            interactive: false,
            ..RunConfig::default()
        };

        let err = run(&config, &mut engine, std::io::empty(), std::io::sink()).unwrap_err();

        assert!(matches!(err, TopologyError::CommandExecutionFailed { .. }));
        assert_eq!(engine.calls().last(), Some(&EngineCall::Stop));
    }
}
