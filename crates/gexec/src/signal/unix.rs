//! POSIX signal delivery.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;

use super::SignalError;
use crate::config::InterruptTarget;

/// Deliver the soft interrupt (SIGINT).
///
/// Group targeting assumes the child leads its own process group, which
/// spawn guarantees whenever group isolation was applied.
pub(crate) fn send_interrupt(pid: u32, target: InterruptTarget) -> Result<(), SignalError> {
    deliver(pid, target, Signal::SIGINT)
}

/// Deliver the hard kill (SIGKILL).
pub(crate) fn force_kill(pid: u32, target: InterruptTarget) -> Result<(), SignalError> {
    deliver(pid, target, Signal::SIGKILL)
}

fn deliver(pid: u32, target: InterruptTarget, signal: Signal) -> Result<(), SignalError> {
    let pid = Pid::from_raw(pid as i32);
    let res = match target {
        InterruptTarget::Group => killpg(pid, signal),
        InterruptTarget::Process => kill(pid, signal),
    };
    match res {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(SignalError::AlreadyExited),
        Err(errno) => Err(SignalError::Os(io::Error::from_raw_os_error(errno as i32))),
    }
}
