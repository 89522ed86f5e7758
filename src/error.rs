//! Error types shared by the loader, the builder and the configuration steps.

use std::path::PathBuf;

/// Errors raised by an [`EmulationEngine`](crate::engine::EmulationEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unknown host: {id}")]
    UnknownHost { id: String },

    #[error("injected failure for command: {command}")]
    Injected { command: String },
}

/// Errors that abort a topology run.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Cannot open input file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file {} is not valid UTF-8 text: {source}", path.display())]
    InvalidEncoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {file} line {line_number}: expected {expected} fields, found {found}: '{content}'")]
    MalformedRecord {
        file: String,
        line_number: usize,
        content: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {field} '{value}' in {file} line {line_number}")]
    InvalidField {
        file: String,
        line_number: usize,
        field: &'static str,
        value: String,
    },

    #[error("Node '{id}' is declared more than once")]
    DuplicateNode { id: String },

    #[error("Unknown node '{id}' referenced by {context}")]
    UnknownNodeReference { id: String, context: String },

    #[error("Command failed on host {host}: '{command}'")]
    CommandExecutionFailed {
        host: String,
        command: String,
        #[source]
        source: EngineError,
    },

    #[error("Emulation engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to reset capture directory {}: {source}", path.display())]
    CaptureReset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Capture started before the capture directory was reset")]
    CaptureNotReady,

    #[error("Interactive session I/O error: {0}")]
    Session(#[source] std::io::Error),
}

pub type Result<T, E = TopologyError> = std::result::Result<T, E>;
