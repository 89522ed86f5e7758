//! Topology construction.
//!
//! Registers one engine host per node and one engine link per distinct
//! undirected pair found in the link records.

use crate::engine::{EmulationEngine, HostHandle, HostSpec};
use crate::error::{Result, TopologyError};
use crate::topology::types::{Edge, LinkConfig, Node};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// A registered host and its engine handle
#[derive(Debug, Clone)]
pub struct HostEntry {
    pub node: Node,
    pub handle: HostHandle,
}

/// The emulated network as created in the engine.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    hosts: Vec<HostEntry>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    links: Vec<LinkConfig>,
}

impl Topology {
    /// Hosts in node-file order.
    pub fn hosts(&self) -> &[HostEntry] {
        &self.hosts
    }

    /// Deduplicated edges in first-occurrence order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn host(&self, id: &str) -> Option<&HostEntry> {
        self.index.get(id).map(|&i| &self.hosts[i])
    }

    /// Handle of `id`, or `UnknownNodeReference` naming `context`.
    pub fn handle(&self, id: &str, context: &str) -> Result<&HostHandle> {
        self.host(id)
            .map(|entry| &entry.handle)
            .ok_or_else(|| TopologyError::UnknownNodeReference {
                id: id.to_string(),
                context: context.to_string(),
            })
    }

    /// Link records whose source endpoint is `id`, in file order.
    pub fn interfaces_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LinkConfig> + 'a {
        self.links.iter().filter(move |link| link.host == id)
    }

    pub fn links(&self) -> &[LinkConfig] {
        &self.links
    }

    /// Ids of the hosts directly linked to `id`.
    pub fn neighbours(&self, id: &str) -> Vec<&str> {
        self.edges.iter().filter_map(|edge| edge.other(id)).collect()
    }
}

/// Derive a link-layer address from a node id.
///
/// Every address is unicast and locally administered (`02:...`), so id `0`
/// never yields the all-zero address. Ids of one or two hex digits become
/// the last octet as written; anything else is hashed into the low 24 bits.
pub fn derive_mac(id: &str) -> String {
    if (1..=2).contains(&id.len()) && id.chars().all(|c| c.is_ascii_hexdigit()) {
        return format!("02:00:00:00:00:{:0>2}", id.to_ascii_lowercase());
    }

    // FNV-1a, stable across runs and platforms
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!(
        "02:00:00:{:02x}:{:02x}:{:02x}",
        (hash >> 16) & 0xff,
        (hash >> 8) & 0xff,
        hash & 0xff
    )
}

/// Check that every link endpoint names a declared node.
pub fn validate_links(nodes: &[Node], links: &[LinkConfig]) -> Result<()> {
    let known: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    for (i, link) in links.iter().enumerate() {
        for id in [&link.host, &link.peer] {
            if !known.contains(id.as_str()) {
                return Err(TopologyError::UnknownNodeReference {
                    id: id.clone(),
                    context: format!("link record {} ({} -> {})", i + 1, link.host, link.peer),
                });
            }
        }
    }
    Ok(())
}

/// Register every node and every distinct undirected link with the engine.
///
/// Links are validated before the first engine call.
pub fn build(
    engine: &mut dyn EmulationEngine,
    nodes: &[Node],
    links: &[LinkConfig],
) -> Result<Topology> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(TopologyError::DuplicateNode { id: node.id.clone() });
        }
    }
    validate_links(nodes, links)?;

    let mut topology = Topology {
        links: links.to_vec(),
        ..Topology::default()
    };

    for node in nodes {
        let spec = HostSpec {
            id: node.id.clone(),
            loopback: node.loopback.clone(),
            mac: derive_mac(&node.id),
        };
        let handle = engine.create_host(&spec)?;
        debug!("registered host {} ({}, {})", spec.id, spec.loopback, spec.mac);
        topology.index.insert(node.id.clone(), topology.hosts.len());
        topology.hosts.push(HostEntry {
            node: node.clone(),
            handle,
        });
    }

    let mut edge_set = HashSet::new();
    for link in links {
        let edge = Edge::new(&link.host, &link.peer);
        if !edge_set.insert(edge.clone()) {
            continue;
        }
        let a = topology.handle(&link.host, "link record")?;
        let b = topology.handle(&link.peer, "link record")?;
        engine.create_link(a, b)?;
        debug!("linked {} <-> {}", link.host, link.peer);
        topology.edges.push(edge);
    }

    info!(
        "Created {} hosts and {} links",
        topology.hosts.len(),
        topology.edges.len()
    );
    Ok(topology)
}

/// Log every host's neighbours.
pub fn dump_connections(topology: &Topology) {
    for entry in topology.hosts() {
        let neighbours = topology.neighbours(&entry.node.id);
        info!("{} -> [{}]", entry.node.id, neighbours.join(", "));
    }
}
