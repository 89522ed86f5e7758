use crate::topology::AddressFamily;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Errors raised while loading a run configuration file
#[derive(Debug, thiserror::Error)]
pub enum RunConfigError {
    #[error("Cannot open run configuration {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid run configuration {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Run-wide settings. Every key is optional in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Node file: `<nodeId> <loopbackAddress>`
    pub loopbacks_file: PathBuf,
    /// Link file: `<nodeId> <peerId> <interfaceIndex> <linkAddress> <loopbackOfPeer>`
    pub links_file: PathBuf,
    /// Path file: `<nodeId> <interfaceIndex> <gatewayAddress> <destinationAddress>`
    pub paths_file: PathBuf,
    /// Start a packet capture on every interface
    pub trace_enabled: bool,
    /// Use IPv4 address and route commands instead of IPv6
    pub use_ipv4: bool,
    /// Capture output directory, emptied at the start of a traced run
    pub capture_dir: PathBuf,
    /// Prefix for network namespace names
    pub namespace_prefix: String,
    /// Drop into the interactive session once configured
    pub interactive: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            loopbacks_file: PathBuf::from("configs/topo-loopbacks.txt"),
            links_file: PathBuf::from("configs/topo-links.txt"),
            paths_file: PathBuf::from("configs/topo-paths.txt"),
            trace_enabled: false,
            use_ipv4: false,
            capture_dir: PathBuf::from("pcaps"),
            namespace_prefix: "tl-".to_string(),
            interactive: true,
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, RunConfigError> {
        let file = File::open(path).map_err(|source| RunConfigError::Open {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_reader(file).map_err(|source| RunConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::from_ipv4_flag(self.use_ipv4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.loopbacks_file, PathBuf::from("configs/topo-loopbacks.txt"));
        assert_eq!(config.links_file, PathBuf::from("configs/topo-links.txt"));
        assert_eq!(config.paths_file, PathBuf::from("configs/topo-paths.txt"));
        assert!(!config.trace_enabled);
        assert_eq!(config.family(), AddressFamily::Ipv6);
    }

    #[test]
    fn test_load_partial_yaml() {
        let yaml = r#"
links_file: "lab/links.txt"
use_ipv4: true
capture_dir: "/tmp/captures"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = RunConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.links_file, PathBuf::from("lab/links.txt"));
        assert_eq!(config.family(), AddressFamily::Ipv4);
        assert_eq!(config.capture_dir, PathBuf::from("/tmp/captures"));
        assert_eq!(config.loopbacks_file, PathBuf::from("configs/topo-loopbacks.txt"));
        assert!(config.interactive);
    }

    #[test]
    fn test_load_rejects_unknown_types() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "trace_enabled: [1, 2]").unwrap();

        assert!(matches!(
            RunConfig::load(temp_file.path()),
            Err(RunConfigError::Parse { .. })
        ));
    }
}
