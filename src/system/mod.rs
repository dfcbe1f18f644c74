use std::{ffi::CStr, io};

use crate::cutils::cerr;
use interface::ProcessId;

use self::signal::SignalNumber;

pub mod interface;

pub mod signal;

pub mod wait;

pub(crate) enum ForkResult {
    // Parent process branch with the child process' PID.
    Parent(ProcessId),
    // Child process branch.
    Child,
}

/// Create a new process.
///
/// The shell never spawns threads, so there is no async-signal-safety hazard
/// between `fork` and `exec` here.
pub(crate) fn fork() -> io::Result<ForkResult> {
    // SAFETY: `fork` cannot cause UB by itself; see the note above about threads.
    let pid = cerr(unsafe { libc::fork() })?;
    if pid == 0 {
        Ok(ForkResult::Child)
    } else {
        Ok(ForkResult::Parent(ProcessId(pid)))
    }
}

/// Terminate the calling process without running any cleanup.
pub(crate) fn _exit(status: libc::c_int) -> ! {
    unsafe { libc::_exit(status) }
}

/// Return the process identifier for the current process.
pub(crate) fn process_id() -> ProcessId {
    // NOTE libstd casts the `i32` that `libc::getpid` returns into `u32`
    // here we cast it back into `i32` (`pid_t`)
    ProcessId(std::process::id() as libc::pid_t)
}

/// Send a signal to a process with the specified ID.
#[cfg(test)]
pub(crate) fn kill(pid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.0, signal) }).map(|_| ())
}

/// Send a signal to a process group with the specified ID.
pub(crate) fn killpg(pgid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pgid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::killpg(pgid.0, signal) }).map(|_| ())
}

/// Get the process group ID of the current process.
pub(crate) fn getpgrp() -> ProcessId {
    // SAFETY: `getpgrp` takes no arguments and always succeeds.
    ProcessId(unsafe { libc::getpgrp() })
}

/// Change the working directory of the calling process.
pub(crate) fn chdir(path: &CStr) -> io::Result<()> {
    // SAFETY: `path` is a valid NUL-terminated string.
    cerr(unsafe { libc::chdir(path.as_ptr()) }).map(|_| ())
}

pub(crate) fn make_zeroed_sigaction() -> libc::sigaction {
    // SAFETY: since sigaction is a C struct, all-zeroes is a valid representation
    // We cannot use a "literal struct" initialization method since the exact representation
    // of libc::sigaction is not fixed
    unsafe { std::mem::zeroed() }
}
