use super::run;
use crate::commands;
use crate::engine::EmulationEngine;
use crate::error::{Result, TopologyError};
use crate::topology::{AddressFamily, Node, PathConfig, Topology};
use log::info;
use std::collections::HashSet;

fn path_context(index: usize) -> String {
    format!("path record {}", index + 1)
}

/// Check path owners against the node table, before any host exists.
pub fn validate_path_hosts(nodes: &[Node], paths: &[PathConfig]) -> Result<()> {
    let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    match paths.iter().enumerate().find(|(_, path)| !known.contains(path.host.as_str())) {
        Some((i, path)) => Err(TopologyError::UnknownNodeReference {
            id: path.host.clone(),
            context: path_context(i),
        }),
        None => Ok(()),
    }
}

/// Check that every path is owned by a known host.
pub fn validate_paths(topology: &Topology, paths: &[PathConfig]) -> Result<()> {
    for (i, path) in paths.iter().enumerate() {
        topology.handle(&path.host, &path_context(i))?;
    }
    Ok(())
}

/// Install one static route per path record, in file order.
///
/// Routes are passed through unchanged: no reachability or cycle checks.
pub fn install_routes(
    engine: &mut dyn EmulationEngine,
    topology: &Topology,
    paths: &[PathConfig],
    family: AddressFamily,
) -> Result<()> {
    validate_paths(topology, paths)?;

    for path in paths {
        let handle = topology.handle(&path.host, "path record")?;
        let command = commands::add_route(family, &path.destination, &path.gateway);
        info!("{} {} (interface {})", path.host, command, path.interface);
        run(engine, handle, &command)?;
    }
    info!("Installed {} static routes", paths.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordingEngine;
    use crate::topology::build;

    fn path(host: &str, gateway: &str, destination: &str) -> PathConfig {
        PathConfig {
            host: host.to_string(),
            interface: 0,
            gateway: gateway.to_string(),
            destination: destination.to_string(),
        }
    }

    fn hosts(engine: &mut RecordingEngine, ids: &[&str]) -> Topology {
        let nodes: Vec<Node> = ids
            .iter()
            .map(|id| Node {
                id: id.to_string(),
                loopback: "fc00::1/128".to_string(),
            })
            .collect();
        build(engine, &nodes, &[]).unwrap()
    }

    #[test]
    fn test_routes_follow_family() {
        let mut engine = RecordingEngine::new();
        let topology = hosts(&mut engine, &["1", "2"]);
        let paths = vec![
            path("1", "fc00:12::2", "fc00::2/128"),
            path("2", "fc00:12::1", "fc00::1/128"),
        ];

        install_routes(&mut engine, &topology, &paths, AddressFamily::Ipv6).unwrap();

        assert_eq!(
            engine.executed(),
            vec![
                ("1", "ip -6 route add fc00::2/128 via fc00:12::2"),
                ("2", "ip -6 route add fc00::1/128 via fc00:12::1"),
            ]
        );
    }

    #[test]
    fn test_unknown_host_installs_nothing() {
        let mut engine = RecordingEngine::new();
        let topology = hosts(&mut engine, &["1"]);
        let paths = vec![path("1", "10.0.0.2", "10.0.0.9/32"), path("Z", "10.0.0.1", "10.0.0.8/32")];

        let err = install_routes(&mut engine, &topology, &paths, AddressFamily::Ipv4).unwrap_err();

        assert!(matches!(err, TopologyError::UnknownNodeReference { ref id, .. } if id == "Z"));
        assert!(engine.executed().is_empty());
    }

    #[test]
    fn test_path_hosts_checked_against_nodes() {
        let nodes = vec![Node {
            id: "1".to_string(),
            loopback: "fc00::1/128".to_string(),
        }];
        let paths = vec![path("1", "fc00:12::2", "fc00::2/128"), path("Z", "fc00:12::1", "fc00::1/128")];

        assert!(validate_path_hosts(&nodes, &paths[..1]).is_ok());
        match validate_path_hosts(&nodes, &paths).unwrap_err() {
            TopologyError::UnknownNodeReference { id, context } => {
                assert_eq!(id, "Z");
                assert_eq!(context, "path record 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_routes_passed_through() {
        let mut engine = RecordingEngine::new();
        let topology = hosts(&mut engine, &["1"]);
        let paths = vec![
            path("1", "10.0.0.2", "10.0.0.9/32"),
            path("1", "10.0.0.3", "10.0.0.9/32"),
        ];

        install_routes(&mut engine, &topology, &paths, AddressFamily::Ipv4).unwrap();
        assert_eq!(engine.commands_for("1").len(), 2);
    }
}
