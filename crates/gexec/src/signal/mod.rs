//! Platform signal bridge.
//!
//! One implementation per target, selected at compile time: POSIX signals
//! on Unix, console control events plus `TerminateProcess` on Windows.
//! Both expose the same two operations: a catchable soft interrupt and an
//! uncatchable hard kill.

use std::io;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::{force_kill, send_interrupt};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::{force_kill, send_interrupt};

/// Outcome of a failed delivery attempt.
///
/// The already-exited case is kept apart from real OS errors: a process
/// exiting right as cancellation fires is an expected race, not a failure.
#[derive(Debug)]
pub(crate) enum SignalError {
    /// The process (or group) was gone before the signal could land.
    AlreadyExited,
    /// The platform call itself failed.
    Os(io::Error),
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::InterruptTarget;

    // PIDs near the kernel maximum are never in use.
    const DEAD_PID: u32 = 1_999_999_999;

    #[test]
    fn interrupt_to_dead_pid_is_benign() {
        match send_interrupt(DEAD_PID, InterruptTarget::Process) {
            Err(SignalError::AlreadyExited) => {}
            other => panic!("expected AlreadyExited, got {other:?}"),
        }
    }

    #[test]
    fn kill_dead_group_is_benign() {
        match force_kill(DEAD_PID, InterruptTarget::Group) {
            Err(SignalError::AlreadyExited) => {}
            other => panic!("expected AlreadyExited, got {other:?}"),
        }
    }
}
