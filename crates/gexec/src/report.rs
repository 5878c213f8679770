//! Composite execution result

use std::process::ExitStatus;

use crate::error::ProcessError;

/// The one authoritative result of a process execution.
///
/// Always reflects the process's own exit status; `killed_by_controller`
/// records whether the escalation controller had to force termination, so
/// callers can tell "cancelled and complied" apart from "cancelled and
/// force-killed".
#[derive(Debug)]
pub struct ExitReport {
    /// Exit code, when the process exited normally
    pub exit_code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    pub signal: Option<i32>,
    /// Whether the escalation controller issued the hard kill
    pub killed_by_controller: bool,
    /// Captured stdout (empty unless the stdout target was `Capture`)
    pub stdout: Vec<u8>,
    /// Captured stderr (empty unless the stderr target was `Capture`)
    pub stderr: Vec<u8>,
    /// Non-fatal errors accumulated during the run: failed signal
    /// deliveries and stream-relay failures
    pub errors: Vec<ProcessError>,
}

impl ExitReport {
    pub(crate) fn new(
        status: ExitStatus,
        killed_by_controller: bool,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        errors: Vec<ProcessError>,
    ) -> Self {
        Self {
            exit_code: status.code(),
            signal: terminating_signal(status),
            killed_by_controller,
            stdout,
            stderr,
            errors,
        }
    }

    /// True when the process exited zero on its own and nothing went wrong.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.killed_by_controller && self.errors.is_empty()
    }

    /// True when the process was terminated by a signal.
    pub fn signaled(&self) -> bool {
        self.signal.is_some()
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn clean_exit_report() {
        use std::os::unix::process::ExitStatusExt;

        let status = ExitStatus::from_raw(0);
        let report = ExitReport::new(status, false, b"out".to_vec(), vec![], vec![]);
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.signal, None);
        assert!(report.success());
        assert!(!report.signaled());
        assert_eq!(report.stdout, b"out");
    }

    #[cfg(unix)]
    #[test]
    fn signaled_report() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait status 9 = terminated by SIGKILL.
        let status = ExitStatus::from_raw(9);
        let report = ExitReport::new(status, true, vec![], vec![], vec![]);
        assert_eq!(report.exit_code, None);
        assert_eq!(report.signal, Some(9));
        assert!(report.signaled());
        assert!(report.killed_by_controller);
        assert!(!report.success());
    }
}
