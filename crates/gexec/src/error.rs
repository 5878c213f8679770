//! Error types for process execution

use std::fmt;
use std::io;
use thiserror::Error;

/// Which standard stream a relay error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// Process execution errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Failed to spawn the process (missing or unexecutable program,
    /// fork/exec failure). Fatal, never retried.
    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The platform signal call failed for a reason other than the
    /// process having already exited.
    #[error("signal delivery to pid {pid} failed: {reason}")]
    SignalDelivery { pid: u32, reason: String },

    /// Hard kill failed at the OS level.
    #[error("failed to kill pid {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O failure while relaying a standard stream into its sink.
    #[error("{stream} relay failed: {reason}")]
    StdioRelay { stream: StreamKind, reason: String },

    /// Waiting on the child failed at the OS level.
    #[error("failed to wait for pid {pid}: {source}")]
    WaitFailed {
        pid: u32,
        #[source]
        source: io::Error,
    },

    /// Invalid process configuration
    #[error("invalid process configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_kind_display() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(StreamKind::Stderr.to_string(), "stderr");
    }

    #[test]
    fn spawn_error_mentions_program() {
        let err = ProcessError::SpawnFailed {
            program: "definitely-missing".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("definitely-missing"));
    }
}
