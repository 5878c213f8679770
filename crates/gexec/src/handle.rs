//! Process handle - spawn, stream relay, and the joining wait

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{InterruptTarget, OutputTarget, ProcessConfig};
use crate::error::{ProcessError, Result, StreamKind};
use crate::escalation::{EscalationController, EscalationShared, EscalationState};
use crate::report::ExitReport;

/// What a finished relay task hands back.
struct RelayOutcome {
    captured: Option<Vec<u8>>,
    error: Option<std::io::Error>,
}

/// A spawned process plus everything that runs on its behalf: one relay
/// task per piped stream and one escalation task watching cancellation.
///
/// `wait` is the single synchronization point: it returns only after the
/// process has exited, both relays have drained, and the escalation task
/// has settled, so the [`ExitReport`] is complete and final.
pub struct ProcessHandle {
    child: Child,
    pid: u32,
    can_interrupt: bool,
    shared: Arc<EscalationShared>,
    exited: CancellationToken,
    controller: Option<JoinHandle<()>>,
    relays: Vec<(StreamKind, JoinHandle<RelayOutcome>)>,
}

impl ProcessHandle {
    /// Spawn a process under the given cancellation token.
    ///
    /// Applies process-group isolation when configured, wires the stdio
    /// targets, and starts the relay and escalation tasks. The escalation
    /// task is only started once a valid pid exists, so cancellation can
    /// never race an unspawned process.
    pub(crate) fn spawn(config: ProcessConfig, cancel: CancellationToken) -> Result<Self> {
        config.validate()?;

        debug!(
            command = %config.command,
            args = ?config.args,
            "spawning process"
        );

        let ProcessConfig {
            command,
            args,
            working_dir,
            env,
            timeout,
            grace_period,
            isolate_process_group,
            interrupt_target,
            stdout,
            stderr,
            inherit_stdin,
        } = config;

        let mut cmd = Command::new(&command);
        cmd.args(&args);
        if let Some(dir) = &working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &env {
            cmd.env(key, value);
        }

        cmd.stdin(if inherit_stdin {
            Stdio::inherit()
        } else {
            Stdio::null()
        });
        cmd.stdout(stdio_for(&stdout));
        cmd.stderr(stdio_for(&stderr));

        // The child must not outlive a dropped handle.
        cmd.kill_on_drop(true);

        if isolate_process_group {
            #[cfg(unix)]
            cmd.process_group(0);
            #[cfg(windows)]
            cmd.creation_flags(windows_sys::Win32::System::Threading::CREATE_NEW_PROCESS_GROUP);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            program: command.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| ProcessError::SpawnFailed {
            program: command.clone(),
            source: std::io::Error::other("process exited before its pid could be read"),
        })?;

        info!(pid, command = %command, "process spawned");

        // Soft interrupts are only deliverable to an isolated group; the
        // console-event and group-signal paths both require it.
        let can_interrupt = isolate_process_group;

        let mut relays = Vec::new();
        if let Some(task) = spawn_relay(child.stdout.take(), stdout) {
            relays.push((StreamKind::Stdout, task));
        }
        if let Some(task) = spawn_relay(child.stderr.take(), stderr) {
            relays.push((StreamKind::Stderr, task));
        }

        let exited = CancellationToken::new();

        // A configured deadline is just another way to cancel: derive a
        // child token and trip it when the timer fires first.
        let cancel = match timeout {
            Some(timeout) => {
                let derived = cancel.child_token();
                let deadline = derived.clone();
                let exit_watch = exited.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = exit_watch.cancelled() => {}
                        _ = tokio::time::sleep(timeout) => {
                            debug!(pid, "timeout elapsed, cancelling process");
                            deadline.cancel();
                        }
                    }
                });
                derived
            }
            None => cancel,
        };

        let shared = Arc::new(EscalationShared::new());
        let controller = EscalationController {
            pid,
            can_interrupt,
            grace_period,
            // Without its own group the child still shares the caller's,
            // so signals must stay aimed at the single pid.
            target: if can_interrupt {
                interrupt_target
            } else {
                InterruptTarget::Process
            },
            shared: Arc::clone(&shared),
        };
        let controller = tokio::spawn(controller.drive(cancel, exited.clone()));

        Ok(Self {
            child,
            pid,
            can_interrupt,
            shared,
            exited,
            controller: Some(controller),
            relays,
        })
    }

    /// Process ID of the child.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether a soft interrupt can be delivered to this process, i.e.
    /// whether group isolation was applied at spawn.
    pub fn can_interrupt(&self) -> bool {
        self.can_interrupt
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EscalationState {
        self.shared.state()
    }

    /// Wait for the process to exit and every relay to drain, then return
    /// the one authoritative [`ExitReport`].
    ///
    /// Joining relay completion is mandatory: reporting before the relays
    /// finish could truncate captured output.
    pub async fn wait(&mut self) -> Result<ExitReport> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|source| ProcessError::WaitFailed {
                pid: self.pid,
                source,
            })?;

        // Natural exit and controller kill contend here; the state machine
        // picks exactly one winner.
        self.shared.mark_exited();
        self.exited.cancel();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut errors = Vec::new();
        for (stream, task) in self.relays.drain(..) {
            match task.await {
                Ok(outcome) => {
                    if let Some(bytes) = outcome.captured {
                        match stream {
                            StreamKind::Stdout => stdout = bytes,
                            StreamKind::Stderr => stderr = bytes,
                        }
                    }
                    if let Some(err) = outcome.error {
                        warn!(pid = self.pid, %stream, error = %err, "stream relay failed");
                        errors.push(ProcessError::StdioRelay {
                            stream,
                            reason: err.to_string(),
                        });
                    }
                }
                Err(join_err) => {
                    warn!(pid = self.pid, %stream, error = %join_err, "relay task aborted");
                    errors.push(ProcessError::StdioRelay {
                        stream,
                        reason: join_err.to_string(),
                    });
                }
            }
        }

        // The exited token makes the controller settle promptly.
        if let Some(controller) = self.controller.take() {
            let _ = controller.await;
        }

        let mut all_errors = self.shared.take_errors();
        all_errors.extend(errors);
        let killed = self.shared.killed_by_controller();
        self.shared.mark_reaped();

        info!(
            pid = self.pid,
            exit_code = ?status.code(),
            killed_by_controller = killed,
            "process exited"
        );

        Ok(ExitReport::new(status, killed, stdout, stderr, all_errors))
    }
}

fn stdio_for(target: &OutputTarget) -> Stdio {
    match target {
        OutputTarget::Inherit => Stdio::inherit(),
        OutputTarget::Discard => Stdio::null(),
        OutputTarget::Capture | OutputTarget::Writer(_) => Stdio::piped(),
    }
}

/// Start one relay task copying a child stream into its sink. Streams that
/// are inherited or discarded need no relay.
fn spawn_relay<R>(reader: Option<R>, target: OutputTarget) -> Option<JoinHandle<RelayOutcome>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut reader = reader?;
    match target {
        OutputTarget::Inherit | OutputTarget::Discard => None,
        OutputTarget::Capture => Some(tokio::spawn(async move {
            let mut captured = Vec::new();
            let error = reader.read_to_end(&mut captured).await.err();
            RelayOutcome {
                captured: Some(captured),
                error,
            }
        })),
        OutputTarget::Writer(mut writer) => Some(tokio::spawn(async move {
            let error = match tokio::io::copy(&mut reader, &mut writer).await {
                Ok(_) => writer.flush().await.err(),
                Err(err) => Some(err),
            };
            RelayOutcome {
                captured: None,
                error,
            }
        })),
    }
}
