//! Process configuration

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWrite;

use crate::error::{ProcessError, Result};

/// Which processes a signal is aimed at.
///
/// `Group` targets the child's whole process group (descendants included),
/// which matches the Windows console-event semantics and is the default.
/// `Process` restricts delivery to the direct child only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptTarget {
    #[default]
    Group,
    Process,
}

/// Destination for a child's stdout or stderr.
pub enum OutputTarget {
    /// Inherit the parent's stream; nothing is relayed.
    Inherit,
    /// Discard the stream (`/dev/null` / `NUL`).
    Discard,
    /// Buffer the stream and return it in the [`ExitReport`](crate::ExitReport).
    Capture,
    /// Relay the stream into a caller-supplied async writer.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::Capture
    }
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Inherit => write!(f, "Inherit"),
            OutputTarget::Discard => write!(f, "Discard"),
            OutputTarget::Capture => write!(f, "Capture"),
            OutputTarget::Writer(_) => write!(f, "Writer(..)"),
        }
    }
}

/// Configuration for spawning a process
#[derive(Debug)]
pub struct ProcessConfig {
    /// Executable command
    pub command: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory (None = current dir)
    pub working_dir: Option<PathBuf>,
    /// Environment variables (added to parent env)
    pub env: HashMap<String, String>,
    /// Deadline for the whole execution; maps to cancellation when it
    /// elapses (None = no deadline)
    pub timeout: Option<Duration>,
    /// How long to wait after the soft interrupt before escalating to a
    /// hard kill. Zero escalates immediately.
    pub grace_period: Duration,
    /// Spawn the child into its own process group / console group. Required
    /// for soft-interrupt delivery; disabling it drops the capability and
    /// cancellation goes straight to a hard kill.
    pub isolate_process_group: bool,
    /// Whether signals target the whole group or only the direct child
    pub interrupt_target: InterruptTarget,
    /// Destination for stdout
    pub stdout: OutputTarget,
    /// Destination for stderr
    pub stderr: OutputTarget,
    /// Inherit the parent's stdin instead of closing it
    pub inherit_stdin: bool,
}

impl ProcessConfig {
    /// Create new process configuration
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
            timeout: None,
            grace_period: Duration::ZERO,
            isolate_process_group: true,
            interrupt_target: InterruptTarget::Group,
            stdout: OutputTarget::Capture,
            stderr: OutputTarget::Capture,
            inherit_stdin: false,
        }
    }

    /// Set command arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set timeout duration
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Set the soft-interrupt grace period
    pub fn grace_period(mut self, duration: Duration) -> Self {
        self.grace_period = duration;
        self
    }

    /// Enable/disable process-group isolation at spawn
    pub fn isolate_process_group(mut self, isolate: bool) -> Self {
        self.isolate_process_group = isolate;
        self
    }

    /// Aim signals at the whole group or the direct child only
    pub fn interrupt_target(mut self, target: InterruptTarget) -> Self {
        self.interrupt_target = target;
        self
    }

    /// Set the stdout destination
    pub fn stdout(mut self, target: OutputTarget) -> Self {
        self.stdout = target;
        self
    }

    /// Set the stderr destination
    pub fn stderr(mut self, target: OutputTarget) -> Self {
        self.stderr = target;
        self
    }

    /// Inherit the parent's stdin
    pub fn inherit_stdin(mut self, inherit: bool) -> Self {
        self.inherit_stdin = inherit;
        self
    }

    /// Reject configurations that cannot possibly spawn.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.command.is_empty() {
            return Err(ProcessError::InvalidConfig(
                "command must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProcessConfig::new("echo");
        assert_eq!(config.command, "echo");
        assert!(config.args.is_empty());
        assert_eq!(config.grace_period, Duration::ZERO);
        assert!(config.isolate_process_group);
        assert_eq!(config.interrupt_target, InterruptTarget::Group);
        assert!(matches!(config.stdout, OutputTarget::Capture));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = ProcessConfig::new("sleep")
            .args(["5"])
            .grace_period(Duration::from_millis(100))
            .timeout_secs(30)
            .interrupt_target(InterruptTarget::Process)
            .env("LANG", "C");
        assert_eq!(config.args, vec!["5".to_string()]);
        assert_eq!(config.grace_period, Duration::from_millis(100));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.interrupt_target, InterruptTarget::Process);
        assert_eq!(config.env.get("LANG").map(String::as_str), Some("C"));
    }

    #[test]
    fn empty_command_rejected() {
        let config = ProcessConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(ProcessError::InvalidConfig(_))
        ));
    }
}
