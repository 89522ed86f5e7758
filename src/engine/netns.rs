use std::process::{Child, Command, Output, Stdio};

use log::{debug, warn};

use super::{EmulationEngine, HostHandle, HostSpec};
use crate::error::EngineError;
use crate::topology::interface_name;

/// A host backed by a Linux network namespace.
#[derive(Debug)]
struct NamespaceHost {
    id: String,
    namespace: String,
    mac: String,
    interfaces: Vec<String>,
}

/// Emulation engine on Linux network namespaces and veth pairs.
///
/// Every host is a namespace named `<prefix><id>`; every link a veth pair
/// whose ends are named `<id>-eth<N>` inside their namespaces. Needs root.
/// Namespaces are deleted on [`stop`](EmulationEngine::stop) or drop.
#[derive(Debug)]
pub struct NetnsEngine {
    prefix: String,
    hosts: Vec<NamespaceHost>,
    background: Vec<Child>,
    stopped: bool,
}

impl NetnsEngine {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            hosts: Vec::new(),
            background: Vec::new(),
            stopped: false,
        }
    }

    fn host(&self, handle: &HostHandle) -> Result<&NamespaceHost, EngineError> {
        self.hosts
            .get(handle.slot())
            .filter(|host| host.id == handle.id())
            .ok_or_else(|| EngineError::UnknownHost {
                id: handle.id().to_string(),
            })
    }

    /// Reserve the next interface name on a host.
    fn next_interface(&mut self, handle: &HostHandle) -> Result<String, EngineError> {
        self.host(handle)?;
        let host = &mut self.hosts[handle.slot()];
        let name = interface_name(&host.id, host.interfaces.len() as u32);
        host.interfaces.push(name.clone());
        Ok(name)
    }

    fn netns_exec(&self, namespace: &str, args: &[&str]) -> Result<Output, EngineError> {
        let mut full_args = vec!["netns", "exec", namespace];
        full_args.extend_from_slice(args);
        ip_checked(&full_args)
    }
}

impl EmulationEngine for NetnsEngine {
    fn create_host(&mut self, spec: &HostSpec) -> Result<HostHandle, EngineError> {
        let namespace = format!("{}{}", self.prefix, spec.id);

        // Stale namespace from an aborted run
        let _ = ip(&["netns", "del", &namespace]);
        ip_checked(&["netns", "add", &namespace])?;
        debug!("created namespace {} for host {}", namespace, spec.id);

        let handle = HostHandle::new(&spec.id, self.hosts.len());
        self.hosts.push(NamespaceHost {
            id: spec.id.clone(),
            namespace,
            mac: spec.mac.clone(),
            interfaces: Vec::new(),
        });
        self.stopped = false;
        Ok(handle)
    }

    fn create_link(&mut self, a: &HostHandle, b: &HostHandle) -> Result<(), EngineError> {
        let a_if = self.next_interface(a)?;
        let b_if = self.next_interface(b)?;
        let a_ns = self.host(a)?.namespace.clone();
        let b_ns = self.host(b)?.namespace.clone();

        ip_checked(&[
            "link", "add", &a_if, "netns", &a_ns, "type", "veth", "peer", "name", &b_if,
            "netns", &b_ns,
        ])?;
        debug!("created veth pair {} <-> {}", a_if, b_if);

        // The first interface of a host carries its synthesized MAC
        for (handle, iface, namespace) in [(a, &a_if, &a_ns), (b, &b_if, &b_ns)] {
            let host = self.host(handle)?;
            if host.interfaces.first() == Some(iface) {
                let mac = host.mac.clone();
                self.netns_exec(namespace, &["ip", "link", "set", "dev", iface, "address", &mac])?;
            }
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        for host in &self.hosts {
            self.netns_exec(&host.namespace, &["ip", "link", "set", "lo", "up"])?;
            for iface in &host.interfaces {
                self.netns_exec(&host.namespace, &["ip", "link", "set", iface, "up"])?;
            }
        }
        debug!("brought up {} hosts", self.hosts.len());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        if self.stopped {
            return Ok(());
        }
        for mut child in self.background.drain(..) {
            let _ = child.kill();
            let _ = child.wait();
        }
        // Deleting a namespace also removes its veth ends
        let result = delete_all(self.hosts.iter().map(|host| host.namespace.as_str()), |ns| {
            debug!("deleting namespace {}", ns);
            ip_checked(&["netns", "del", ns]).map(|_| ())
        });
        self.stopped = true;
        result
    }

    fn execute(&mut self, handle: &HostHandle, command: &str) -> Result<String, EngineError> {
        let host = self.host(handle)?;
        let output = Command::new("ip")
            .args(["netns", "exec", &host.namespace, "sh", "-c", command])
            .output()
            .map_err(|source| EngineError::Io {
                context: format!("exec '{}' in namespace {}", command, host.namespace),
                source,
            })?;

        if !output.status.success() {
            warn!(
                "{}: '{}' exited with {}: {}",
                host.id,
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    fn spawn_background(&mut self, handle: &HostHandle, command: &str) -> Result<(), EngineError> {
        let host = self.host(handle)?;
        let child = Command::new("ip")
            .args(["netns", "exec", &host.namespace, "sh", "-c", command])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Io {
                context: format!("spawn '{}' in namespace {}", command, host.namespace),
                source,
            })?;
        debug!("{}: spawned '{}' (pid {})", host.id, command, child.id());
        self.background.push(child);
        Ok(())
    }
}

impl Drop for NetnsEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("namespace cleanup failed: {}", e);
        }
    }
}

/// Delete every namespace, even after a failure. Returns the first error.
fn delete_all<'a, I, F>(namespaces: I, mut delete: F) -> Result<(), EngineError>
where
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str) -> Result<(), EngineError>,
{
    let mut first_err = None;
    for ns in namespaces {
        if let Err(e) = delete(ns) {
            warn!("failed to delete namespace {}: {}", ns, e);
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Run `ip <args>`, returning raw output.
fn ip(args: &[&str]) -> Result<Output, EngineError> {
    Command::new("ip")
        .args(args)
        .output()
        .map_err(|source| EngineError::Io {
            context: format!("ip {}", args.join(" ")),
            source,
        })
}

/// Run `ip <args>`, failing with its stderr if it exits non-zero.
fn ip_checked(args: &[&str]) -> Result<Output, EngineError> {
    let output = ip(args)?;
    if !output.status.success() {
        return Err(EngineError::CommandFailed {
            command: format!("ip {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
