//! Windows console-control-event delivery.

use std::io;

use windows_sys::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER};
use windows_sys::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT};
use windows_sys::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

use super::SignalError;
use crate::config::InterruptTarget;

/// Deliver the soft interrupt as a Ctrl+Break console event.
///
/// The event goes to the console process group rooted at `pid`, so it only
/// reaches the child (and its descendants) when the child was created with
/// `CREATE_NEW_PROCESS_GROUP`. There is no child-only variant on Windows;
/// the group is the unit of delivery.
pub(crate) fn send_interrupt(pid: u32, _target: InterruptTarget) -> Result<(), SignalError> {
    let ok = unsafe { GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid) };
    if ok == 0 {
        let err = io::Error::last_os_error();
        // An unknown process group means the process is already gone.
        if err.raw_os_error() == Some(ERROR_INVALID_PARAMETER as i32) {
            return Err(SignalError::AlreadyExited);
        }
        return Err(SignalError::Os(err));
    }
    Ok(())
}

/// Terminate the process unconditionally.
pub(crate) fn force_kill(pid: u32, _target: InterruptTarget) -> Result<(), SignalError> {
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let err = io::Error::last_os_error();
            // Both codes are how OpenProcess reports an exited pid.
            let code = err.raw_os_error();
            if code == Some(ERROR_INVALID_PARAMETER as i32)
                || code == Some(ERROR_ACCESS_DENIED as i32)
            {
                return Err(SignalError::AlreadyExited);
            }
            return Err(SignalError::Os(err));
        }

        let ok = TerminateProcess(handle, 1);
        let err = io::Error::last_os_error();
        CloseHandle(handle);

        if ok == 0 {
            return Err(SignalError::Os(err));
        }
        Ok(())
    }
}
