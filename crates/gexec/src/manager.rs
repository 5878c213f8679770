//! Process manager - lifecycle facade

use tokio_util::sync::CancellationToken;

use crate::config::ProcessConfig;
use crate::error::Result;
use crate::handle::ProcessHandle;
use crate::report::ExitReport;

/// Spawns and runs cancellation-aware processes.
pub struct ProcessManager;

impl ProcessManager {
    /// Create new process manager
    pub fn new() -> Self {
        Self
    }

    /// Spawn a process under a cancellation token.
    ///
    /// Fails fast when the executable is missing or cannot be executed;
    /// spawn failures are never retried.
    ///
    /// # Examples
    /// ```no_run
    /// use gexec::{ProcessConfig, ProcessManager};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = ProcessManager::new();
    /// let config = ProcessConfig::new("echo").args(["hello"]);
    /// let mut handle = manager.spawn(config, CancellationToken::new()).await?;
    /// let report = handle.wait().await?;
    /// assert_eq!(report.exit_code, Some(0));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn spawn(
        &self,
        config: ProcessConfig,
        cancel: CancellationToken,
    ) -> Result<ProcessHandle> {
        ProcessHandle::spawn(config, cancel)
    }

    /// Spawn a process and wait for its complete result.
    ///
    /// Cancelling the token triggers the soft-interrupt escalation; the
    /// returned report still reflects the process's own exit status.
    ///
    /// # Examples
    /// ```no_run
    /// use std::time::Duration;
    /// use gexec::{ProcessConfig, ProcessManager};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let cancel = CancellationToken::new();
    /// let config = ProcessConfig::new("sleep")
    ///     .args(["30"])
    ///     .grace_period(Duration::from_millis(500));
    /// let report = ProcessManager::new().run(config, cancel).await?;
    /// println!("killed: {}", report.killed_by_controller);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, config: ProcessConfig, cancel: CancellationToken) -> Result<ExitReport> {
        let mut handle = self.spawn(config, cancel).await?;
        handle.wait().await
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}
