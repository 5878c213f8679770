//! Cancellation-driven escalation: soft interrupt, grace period, hard kill.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::InterruptTarget;
use crate::error::ProcessError;
use crate::signal::{self, SignalError};

/// Lifecycle of a running process, reached-exactly-once by construction:
/// every transition goes through the state mutex and terminal states
/// refuse further movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    /// Spawned and running, no cancellation seen yet
    Running,
    /// Soft interrupt delivered, grace timer armed
    InterruptSent,
    /// The controller issued the hard kill
    Killed,
    /// The process exited on its own before any hard kill
    ExitedNaturally,
    /// Exit status collected and relays drained; nothing left to release
    Reaped,
}

/// State shared between the escalation task and `ProcessHandle::wait`.
pub(crate) struct EscalationShared {
    state: Mutex<EscalationState>,
    killed_by_controller: AtomicBool,
    errors: Mutex<Vec<ProcessError>>,
}

impl EscalationShared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(EscalationState::Running),
            killed_by_controller: AtomicBool::new(false),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn state(&self) -> EscalationState {
        *self.state.lock().unwrap()
    }

    pub(crate) fn killed_by_controller(&self) -> bool {
        self.killed_by_controller.load(Ordering::SeqCst)
    }

    /// Running -> InterruptSent. False when cancellation already raced
    /// with another transition; the caller must not deliver the signal.
    fn try_mark_interrupt_sent(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == EscalationState::Running {
            *state = EscalationState::InterruptSent;
            true
        } else {
            false
        }
    }

    /// Called by `wait` the moment the child's own exit is observed.
    /// A kill that already happened wins; otherwise the exit was natural.
    pub(crate) fn mark_exited(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(
            *state,
            EscalationState::Running | EscalationState::InterruptSent
        ) {
            *state = EscalationState::ExitedNaturally;
        }
    }

    /// Final transition, after the status is collected and relays drained.
    pub(crate) fn mark_reaped(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(
            *state,
            EscalationState::Killed | EscalationState::ExitedNaturally
        ) {
            *state = EscalationState::Reaped;
        }
    }

    pub(crate) fn record_error(&self, err: ProcessError) {
        self.errors.lock().unwrap().push(err);
    }

    pub(crate) fn take_errors(&self) -> Vec<ProcessError> {
        std::mem::take(&mut self.errors.lock().unwrap())
    }
}

/// Per-process task that watches the cancellation input and walks the
/// process through soft interrupt, grace period and hard kill.
pub(crate) struct EscalationController {
    pub(crate) pid: u32,
    pub(crate) can_interrupt: bool,
    pub(crate) grace_period: Duration,
    pub(crate) target: InterruptTarget,
    pub(crate) shared: Arc<EscalationShared>,
}

impl EscalationController {
    /// Runs until the process exits or the kill has been issued. `exited`
    /// is cancelled by `wait` once the child's exit status is in hand, so
    /// no signal is ever aimed at a reaped pid.
    pub(crate) async fn drive(self, cancel: CancellationToken, exited: CancellationToken) {
        tokio::select! {
            _ = exited.cancelled() => return,
            _ = cancel.cancelled() => {}
        }

        if self.can_interrupt {
            self.send_soft_interrupt();

            tokio::select! {
                // Complied with the interrupt; no hard kill.
                _ = exited.cancelled() => return,
                _ = tokio::time::sleep(self.grace_period) => {
                    debug!(pid = self.pid, "grace period expired");
                }
            }
        }

        self.hard_kill();
    }

    fn send_soft_interrupt(&self) {
        if !self.shared.try_mark_interrupt_sent() {
            return;
        }
        match signal::send_interrupt(self.pid, self.target) {
            Ok(()) => {
                info!(pid = self.pid, interrupt_target = ?self.target, "soft interrupt sent");
            }
            Err(SignalError::AlreadyExited) => {
                // The cancellation race: the process finished on its own
                // right as cancellation fired.
                debug!(pid = self.pid, "process exited before interrupt delivery");
            }
            Err(SignalError::Os(err)) => {
                warn!(pid = self.pid, error = %err, "soft interrupt delivery failed");
                self.shared.record_error(ProcessError::SignalDelivery {
                    pid: self.pid,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Unconditional termination. The state transition and the syscall
    /// happen under the state lock so a racing natural exit cannot be
    /// followed by a kill aimed at a recycled pid.
    fn hard_kill(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if !matches!(
            *state,
            EscalationState::Running | EscalationState::InterruptSent
        ) {
            return;
        }

        match signal::force_kill(self.pid, self.target) {
            Ok(()) => {
                *state = EscalationState::Killed;
                self.shared
                    .killed_by_controller
                    .store(true, Ordering::SeqCst);
                drop(state);
                info!(pid = self.pid, "process killed");
            }
            Err(SignalError::AlreadyExited) => {
                drop(state);
                debug!(pid = self.pid, "process exited before kill delivery");
            }
            Err(SignalError::Os(err)) => {
                drop(state);
                warn!(pid = self.pid, error = %err, "hard kill failed");
                self.shared.record_error(ProcessError::KillFailed {
                    pid: self.pid,
                    reason: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_sent_at_most_once() {
        let shared = EscalationShared::new();
        assert!(shared.try_mark_interrupt_sent());
        assert!(!shared.try_mark_interrupt_sent());
        assert_eq!(shared.state(), EscalationState::InterruptSent);
    }

    #[test]
    fn natural_exit_wins_over_late_interrupt() {
        let shared = EscalationShared::new();
        shared.mark_exited();
        assert_eq!(shared.state(), EscalationState::ExitedNaturally);
        assert!(!shared.try_mark_interrupt_sent());
        assert!(!shared.killed_by_controller());
    }

    #[test]
    fn kill_wins_over_subsequent_exit_observation() {
        let shared = EscalationShared::new();
        assert!(shared.try_mark_interrupt_sent());
        *shared.state.lock().unwrap() = EscalationState::Killed;
        shared.killed_by_controller.store(true, Ordering::SeqCst);

        // wait() observing the exit afterwards must not demote the state.
        shared.mark_exited();
        assert_eq!(shared.state(), EscalationState::Killed);
        assert!(shared.killed_by_controller());

        shared.mark_reaped();
        assert_eq!(shared.state(), EscalationState::Reaped);
    }

    #[test]
    fn reaped_only_from_terminal_states() {
        let shared = EscalationShared::new();
        shared.mark_reaped();
        assert_eq!(shared.state(), EscalationState::Running);

        shared.mark_exited();
        shared.mark_reaped();
        assert_eq!(shared.state(), EscalationState::Reaped);
    }

    #[test]
    fn errors_accumulate_and_drain() {
        let shared = EscalationShared::new();
        shared.record_error(ProcessError::SignalDelivery {
            pid: 1,
            reason: "nope".into(),
        });
        let errors = shared.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(shared.take_errors().is_empty());
    }
}
