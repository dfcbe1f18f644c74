use std::sync::atomic::{AtomicBool, Ordering};

use libc::{c_int, c_void, siginfo_t, STDOUT_FILENO};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_NOTICE: &str = "Entering foreground-only mode (& is now ignored)\n";
const EXIT_NOTICE: &str = "Exiting foreground-only mode\n";

/// Whether `&` requests are currently demoted to foreground runs.
///
/// Written only by [`toggle_siginfo`]; the main loop reads it at the single point where it
/// decides how to wait on a just-launched child.
pub(crate) fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Signal-catching function that flips the execution mode.
///
/// This runs in async signal context, so the notice goes out with a raw `write` to the stdout
/// descriptor; the stdio buffers may be mid-update when the handler fires.
pub(super) unsafe extern "C" fn toggle_siginfo(
    _signal: c_int,
    _info: *const siginfo_t,
    _context: *const c_void,
) {
    let notice = if FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst) {
        EXIT_NOTICE
    } else {
        ENTER_NOTICE
    };
    // SAFETY: `write` is async-signal-safe, the buffer is static and the call cannot cause UB
    // even if the descriptor was closed.
    unsafe { libc::write(STDOUT_FILENO, notice.as_ptr().cast(), notice.len()) };
}

#[cfg(test)]
mod tests {
    use std::os::fd::AsRawFd;

    use super::{foreground_only, FOREGROUND_ONLY};
    use crate::cutils::cerr;
    use crate::system::{
        _exit, fork, kill, process_id,
        signal::{consts::SIGTSTP, SignalHandler, SignalHandlerBehavior},
        wait::{Wait, WaitOptions},
        ForkResult,
    };

    #[test]
    fn sigtstp_flips_the_mode() {
        let ForkResult::Parent(child_pid) = fork().unwrap() else {
            // the notices would land in the test output otherwise
            let devnull = std::fs::File::options()
                .write(true)
                .open("/dev/null")
                .unwrap();
            cerr(unsafe { libc::dup2(devnull.as_raw_fd(), libc::STDOUT_FILENO) }).unwrap();

            let _handler =
                SignalHandler::register(SIGTSTP, SignalHandlerBehavior::ToggleForegroundOnly)
                    .unwrap();

            assert!(!foreground_only());
            kill(process_id(), SIGTSTP).unwrap();
            let entered = foreground_only();
            kill(process_id(), SIGTSTP).unwrap();
            let exited = !foreground_only();

            _exit(if entered && exited { 0 } else { 1 });
        };

        let (_, status) = child_pid.wait(WaitOptions::new()).unwrap();
        assert_eq!(status.exit_status(), Some(0));

        // the parent never installed the handler, its own flag is untouched
        assert!(!FOREGROUND_ONLY.load(std::sync::atomic::Ordering::SeqCst));
    }
}
