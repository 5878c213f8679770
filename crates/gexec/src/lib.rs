//! # gexec
//!
//! **Purpose**: cancellation-aware execution of external processes with
//! graceful interrupt escalation
//!
//! Spawns a child process, relays its standard streams without truncation,
//! and, when the caller's [`CancellationToken`] fires, attempts a polite
//! shutdown before forcibly killing the process.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken
//!
//! ## Features
//!
//! - **Group isolation**: children are spawned into their own process group
//!   (console process group on Windows) so interrupts reach them without
//!   hitting the caller
//! - **Soft interrupt**: SIGINT on Unix, Ctrl+Break console event on Windows
//! - **Escalation**: soft interrupt, configurable grace period, then an
//!   uncatchable hard kill — termination is always bounded
//! - **Authoritative result**: one [`ExitReport`] per process with the real
//!   exit code, signal identity, and whether the controller had to kill
//! - **Stream relay**: per-stream tasks capture output or copy it into
//!   caller-supplied writers, fully drained before `wait` returns
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use gexec::{ProcessConfig, ProcessManager};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancellationToken::new();
//!
//! let config = ProcessConfig::new("cargo")
//!     .args(["build"])
//!     .grace_period(Duration::from_secs(2))
//!     .timeout_secs(300);
//!
//! let report = ProcessManager::new().run(config, cancel).await?;
//! if report.killed_by_controller {
//!     eprintln!("build had to be force-killed");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Logging goes through the [`tracing`] facade; pick any subscriber.

pub mod config;
pub mod error;
pub mod escalation;
pub mod handle;
pub mod manager;
pub mod report;

mod signal;

pub use config::{InterruptTarget, OutputTarget, ProcessConfig};
pub use error::{ProcessError, Result, StreamKind};
pub use escalation::EscalationState;
pub use handle::ProcessHandle;
pub use manager::ProcessManager;
pub use report::ExitReport;
