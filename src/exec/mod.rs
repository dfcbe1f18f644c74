use std::{fmt, io, os::unix::process::CommandExt, process::Command};

use crate::{
    log::{dev_info, dev_warn},
    parse::CommandLine,
    system::{
        _exit, fork,
        interface::ProcessId,
        signal::{consts::*, SignalHandler, SignalHandlerBehavior, SignalNumber},
        wait::{Wait, WaitError, WaitOptions, WaitStatus, ANY_CHILD},
        ForkResult,
    },
};

mod redirect;

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitReason {
    Code(i32),
    Signal(SignalNumber),
}

impl ExitReason {
    fn from_status(status: &WaitStatus) -> Self {
        if let Some(signal) = status.term_signal() {
            Self::Signal(signal)
        } else if let Some(code) = status.exit_status() {
            Self::Code(code)
        } else {
            // neither exited nor signaled should be impossible without `WUNTRACED`
            Self::Code(1)
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "exit value {code}"),
            ExitReason::Signal(signal) => write!(f, "terminated by signal {signal}"),
        }
    }
}

/// Fork and execute one external command.
///
/// The child restores the default Ctrl-C disposition, rebinds its standard streams per the
/// command's redirections and replaces itself with the program, searching `PATH`. A child that
/// cannot exec reports it and exits with status 1; the shell carries on. A failed `fork` is
/// returned to the caller, for whom it is fatal.
pub(crate) fn spawn_command(cmdline: &CommandLine) -> io::Result<ProcessId> {
    let mut command = Command::new(&cmdline.arguments[0]);
    command.args(&cmdline.arguments[1..]);

    let ForkResult::Parent(child_pid) = fork().map_err(|err| {
        dev_warn!("unable to fork command process: {err}");
        err
    })?
    else {
        // the shell ignores Ctrl-C; its children must not
        match SignalHandler::register(SIGINT, SignalHandlerBehavior::Default) {
            Ok(handler) => handler.forget(),
            Err(err) => dev_warn!("cannot reset SIGINT disposition: {err}"),
        }

        if let Err(err) = redirect::apply(
            cmdline.stdin_file.as_deref(),
            cmdline.stdout_file.as_deref(),
        ) {
            eprintln_ignore_io_error!("{err}");
            _exit(1);
        }

        let err = command.exec();

        // `exec` only returns on failure
        dev_warn!("failed to execute command: {err}");
        println_ignore_io_error!("{}: no such file or directory", cmdline.arguments[0]);
        _exit(1);
    };

    dev_info!("executed command with pid {child_pid}");

    Ok(child_pid)
}

/// Block until the given foreground child terminates, riding out interruptions.
pub(crate) fn wait_foreground(pid: ProcessId) -> io::Result<ExitReason> {
    let status = loop {
        match pid.wait(WaitOptions::new()) {
            Ok((_, status)) => break status,
            Err(WaitError::Io(err)) if was_interrupted(&err) => {}
            Err(WaitError::Io(err)) => return Err(err),
            // cannot happen without `WaitOptions::no_hang`
            Err(WaitError::NotReady) => {}
        }
    };

    Ok(ExitReason::from_status(&status))
}

/// Non-blocking check on a just-launched background child.
///
/// `Ok(Some(_))` means the child already finished and has now been reaped; the caller must
/// report it, nothing else will.
pub(crate) fn try_reap(pid: ProcessId) -> io::Result<Option<ExitReason>> {
    loop {
        match pid.wait(WaitOptions::new().no_hang()) {
            Ok((_, status)) => break Ok(Some(ExitReason::from_status(&status))),
            Err(WaitError::NotReady) => break Ok(None),
            Err(WaitError::Io(err)) if was_interrupted(&err) => {}
            Err(WaitError::Io(err)) => break Err(err),
        }
    }
}

/// Collect every background child that has terminated since the last poll.
///
/// Each reaped child leaves the process table for good, so the caller must report every entry
/// of the result; none will show up again.
pub(crate) fn reap_finished() -> Vec<(ProcessId, ExitReason)> {
    let mut finished = Vec::new();

    loop {
        match ANY_CHILD.wait(WaitOptions::new().no_hang()) {
            Ok((pid, status)) => finished.push((pid, ExitReason::from_status(&status))),
            Err(WaitError::NotReady) => break,
            Err(WaitError::Io(err)) if was_interrupted(&err) => {}
            // ECHILD: no children left at all
            Err(WaitError::Io(_)) => break,
        }
    }

    finished
}

fn was_interrupted(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::Interrupted
}
