//! In-memory engine that records every call in order.
//!
//! Backs `--dry-run` and the test suite. Failures can be injected per
//! command substring to exercise error propagation.

use super::{EmulationEngine, HostHandle, HostSpec};
use crate::error::EngineError;
use serde::Serialize;

/// One recorded engine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum EngineCall {
    CreateHost {
        id: String,
        loopback: String,
        mac: String,
    },
    CreateLink {
        a: String,
        b: String,
    },
    Start,
    Stop,
    Execute {
        host: String,
        command: String,
    },
    Background {
        host: String,
        command: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Vec<EngineCall>,
    hosts: Vec<String>,
    failures: Vec<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `execute` whose command contains `pattern` fail.
    pub fn fail_on(mut self, pattern: &str) -> Self {
        self.failures.push(pattern.to_string());
        self
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn host_ids(&self) -> &[String] {
        &self.hosts
    }

    /// `(a, b)` of every link creation call.
    pub fn links(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::CreateLink { a, b } => Some((a.as_str(), b.as_str())),
                _ => None,
            })
            .collect()
    }

    /// `(host, command)` of every foreground command, in issue order.
    pub fn executed(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Execute { host, command } => Some((host.as_str(), command.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Foreground commands issued on one host, in order.
    pub fn commands_for(&self, host: &str) -> Vec<&str> {
        self.executed()
            .into_iter()
            .filter(|(h, _)| *h == host)
            .map(|(_, command)| command)
            .collect()
    }

    fn check_host(&self, host: &HostHandle) -> Result<(), EngineError> {
        match self.hosts.get(host.slot()) {
            Some(id) if id == host.id() => Ok(()),
            _ => Err(EngineError::UnknownHost {
                id: host.id().to_string(),
            }),
        }
    }
}

impl EmulationEngine for RecordingEngine {
    fn create_host(&mut self, spec: &HostSpec) -> Result<HostHandle, EngineError> {
        let handle = HostHandle::new(&spec.id, self.hosts.len());
        self.hosts.push(spec.id.clone());
        self.calls.push(EngineCall::CreateHost {
            id: spec.id.clone(),
            loopback: spec.loopback.clone(),
            mac: spec.mac.clone(),
        });
        Ok(handle)
    }

    fn create_link(&mut self, a: &HostHandle, b: &HostHandle) -> Result<(), EngineError> {
        self.check_host(a)?;
        self.check_host(b)?;
        self.calls.push(EngineCall::CreateLink {
            a: a.id().to_string(),
            b: b.id().to_string(),
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Start);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Stop);
        Ok(())
    }

    fn execute(&mut self, host: &HostHandle, command: &str) -> Result<String, EngineError> {
        self.check_host(host)?;
        if self.failures.iter().any(|pattern| command.contains(pattern.as_str())) {
            return Err(EngineError::Injected {
                command: command.to_string(),
            });
        }
        self.calls.push(EngineCall::Execute {
            host: host.id().to_string(),
            command: command.to_string(),
        });
        Ok(String::new())
    }

    fn spawn_background(&mut self, host: &HostHandle, command: &str) -> Result<(), EngineError> {
        self.check_host(host)?;
        self.calls.push(EngineCall::Background {
            host: host.id().to_string(),
            command: command.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> HostSpec {
        HostSpec {
            id: id.to_string(),
            loopback: "::1/128".to_string(),
            mac: "02:00:00:00:00:01".to_string(),
        }
    }

    #[test]
    fn test_records_calls_in_order() {
        let mut engine = RecordingEngine::new();
        let a = engine.create_host(&spec("a")).unwrap();
        let b = engine.create_host(&spec("b")).unwrap();
        engine.create_link(&a, &b).unwrap();
        engine.execute(&b, "ip link").unwrap();

        assert_eq!(engine.host_ids(), ["a", "b"]);
        assert_eq!(engine.links(), vec![("a", "b")]);
        assert_eq!(engine.commands_for("b"), vec!["ip link"]);
        assert!(engine.commands_for("a").is_empty());
    }

    #[test]
    fn test_unknown_handle_is_rejected() {
        let mut engine = RecordingEngine::new();
        let stray = HostHandle::new("z", 3);
        assert!(matches!(
            engine.execute(&stray, "true"),
            Err(EngineError::UnknownHost { .. })
        ));
    }

    #[test]
    fn test_injected_failure() {
        let mut engine = RecordingEngine::new().fail_on("route");
        let a = engine.create_host(&spec("a")).unwrap();
        assert!(engine.execute(&a, "ip addr add ::1 dev lo").is_ok());
        assert!(matches!(
            engine.execute(&a, "ip -6 route add ::2 via ::3"),
            Err(EngineError::Injected { .. })
        ));
        assert_eq!(engine.executed().len(), 1);
    }

    #[test]
    fn test_calls_serialize_as_tagged_json() {
        let call = EngineCall::Execute {
            host: "a".to_string(),
            command: "true".to_string(),
        };
        let json = serde_json::to_string(&call).unwrap();
        assert_eq!(json, r#"{"call":"execute","host":"a","command":"true"}"#);
    }
}
