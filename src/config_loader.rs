use crate::config::RunConfig;
use crate::error::{Result, TopologyError};
use crate::topology::{LinkConfig, Node, PathConfig};
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const NODE_FIELDS: usize = 2;
const LINK_FIELDS: usize = 5;
const PATH_FIELDS: usize = 4;

/// The three input tables of a run, in file order.
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub nodes: Vec<Node>,
    pub links: Vec<LinkConfig>,
    pub paths: Vec<PathConfig>,
}

/// Load the loopback, link and path files named by the run configuration.
///
/// Nothing is returned unless all three files parse.
pub fn load_inputs(config: &RunConfig) -> Result<InputTables> {
    let nodes = load_nodes(&config.loopbacks_file)?;
    let links = load_links(&config.links_file)?;
    let paths = load_paths(&config.paths_file)?;

    info!(
        "Loaded {} nodes, {} link endpoints, {} paths",
        nodes.len(),
        links.len(),
        paths.len()
    );

    Ok(InputTables { nodes, links, paths })
}

/// Load `<nodeId> <loopbackAddress>` records.
pub fn load_nodes(path: &Path) -> Result<Vec<Node>> {
    info!("Loading loopbacks from: {:?}", path);
    parse_nodes(&path.display().to_string(), &read_input(path)?)
}

/// Load `<nodeId> <peerId> <interfaceIndex> <linkAddress> <loopbackOfPeer>` records.
pub fn load_links(path: &Path) -> Result<Vec<LinkConfig>> {
    info!("Loading links from: {:?}", path);
    parse_links(&path.display().to_string(), &read_input(path)?)
}

/// Load `<nodeId> <interfaceIndex> <gatewayAddress> <destinationAddress>` records.
pub fn load_paths(path: &Path) -> Result<Vec<PathConfig>> {
    info!("Loading paths from: {:?}", path);
    parse_paths(&path.display().to_string(), &read_input(path)?)
}

pub fn parse_nodes(file: &str, text: &str) -> Result<Vec<Node>> {
    records(file, text, NODE_FIELDS)
        .map(|record| -> Result<Node> {
            let (_, fields) = record?;
            Ok(Node {
                id: fields[0].to_string(),
                loopback: fields[1].to_string(),
            })
        })
        .collect()
}

pub fn parse_links(file: &str, text: &str) -> Result<Vec<LinkConfig>> {
    records(file, text, LINK_FIELDS)
        .map(|record| -> Result<LinkConfig> {
            let (line_number, fields) = record?;
            Ok(LinkConfig {
                host: fields[0].to_string(),
                peer: fields[1].to_string(),
                interface: parse_interface(file, line_number, fields[2])?,
                address: fields[3].to_string(),
                peer_loopback: fields[4].to_string(),
            })
        })
        .collect()
}

pub fn parse_paths(file: &str, text: &str) -> Result<Vec<PathConfig>> {
    records(file, text, PATH_FIELDS)
        .map(|record| -> Result<PathConfig> {
            let (line_number, fields) = record?;
            Ok(PathConfig {
                host: fields[0].to_string(),
                interface: parse_interface(file, line_number, fields[1])?,
                gateway: fields[2].to_string(),
                destination: fields[3].to_string(),
            })
        })
        .collect()
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::InvalidData => TopologyError::InvalidEncoding {
            path: path.to_path_buf(),
            source,
        },
        _ => TopologyError::FileNotFound {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Split non-blank lines into exactly `expected` whitespace-separated fields.
///
/// Yields the 1-based line number alongside the fields.
fn records<'a>(
    file: &'a str,
    text: &'a str,
    expected: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&'a str>)>> + 'a {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(index, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != expected {
                return Err(TopologyError::MalformedRecord {
                    file: file.to_string(),
                    line_number: index + 1,
                    content: line.to_string(),
                    expected,
                    found: fields.len(),
                });
            }
            Ok((index + 1, fields))
        })
}

fn parse_interface(file: &str, line_number: usize, value: &str) -> Result<u32> {
    value.parse().map_err(|_| TopologyError::InvalidField {
        file: file.to_string(),
        line_number,
        field: "interface index",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_nodes_skips_blank_lines() {
        let nodes = parse_nodes("loopbacks", "1 fc00::1/128\n\n2 fc00::2/128\n\n").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "1");
        assert_eq!(nodes[1].loopback, "fc00::2/128");
    }

    #[test]
    fn test_parse_links() {
        let links = parse_links("links", "A B 0 10.0.0.5/30 10.0.0.2/32\n").unwrap();
        assert_eq!(
            links[0],
            LinkConfig {
                host: "A".to_string(),
                peer: "B".to_string(),
                interface: 0,
                address: "10.0.0.5/30".to_string(),
                peer_loopback: "10.0.0.2/32".to_string(),
            }
        );
        assert_eq!(links[0].interface_name(), "A-eth0");
    }

    #[test]
    fn test_parse_paths() {
        let paths = parse_paths("paths", "A 0 10.0.0.6 10.0.0.2/32").unwrap();
        assert_eq!(paths[0].gateway, "10.0.0.6");
        assert_eq!(paths[0].destination, "10.0.0.2/32");
    }

    #[test]
    fn test_wrong_field_count_fails_whole_load() {
        let err = parse_links("links", "A B 0 10.0.0.5/30 10.0.0.2/32\nB A 0 10.0.0.6/30\n")
            .unwrap_err();
        match err {
            TopologyError::MalformedRecord {
                file,
                line_number,
                content,
                expected,
                found,
            } => {
                assert_eq!(file, "links");
                assert_eq!(line_number, 2);
                assert_eq!(content, "B A 0 10.0.0.6/30");
                assert_eq!(expected, 5);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_interface() {
        let err = parse_paths("paths", "A x 10.0.0.6 10.0.0.2/32").unwrap_err();
        assert!(matches!(err, TopologyError::InvalidField { line_number: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_nodes(Path::new("/nonexistent/topo-loopbacks.txt")).unwrap_err();
        assert!(matches!(err, TopologyError::FileNotFound { .. }));
    }

    #[test]
    fn test_binary_file_is_not_reported_missing() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&[b'A', b' ', 0xff, 0xfe, b'\n']).unwrap();

        let err = load_nodes(temp_file.path()).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidEncoding { .. }));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_load_nodes_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "A 10.0.0.1/32\nB 10.0.0.2/32\n").unwrap();

        let nodes = load_nodes(temp_file.path()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].id, "B");
    }
}
