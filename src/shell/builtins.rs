use std::{env, ffi::CString, io, os::unix::ffi::OsStrExt, path::PathBuf};

use crate::{
    common::Error,
    system::{
        chdir, getpgrp, killpg,
        signal::{consts::SIGTERM, SignalHandler, SignalHandlerBehavior},
    },
};

/// `cd [path]`: change the working directory, defaulting to the user's home directory.
pub(super) fn cd(argument: Option<&String>) -> Result<(), Error> {
    let target = match argument {
        Some(path) => PathBuf::from(path),
        None => env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
            Error::ChDir(
                "~".into(),
                io::Error::new(io::ErrorKind::NotFound, "HOME is not set"),
            )
        })?,
    };

    let c_path = CString::new(target.as_os_str().as_bytes())
        .map_err(|_| Error::ChDir(target.clone(), io::ErrorKind::InvalidInput.into()))?;

    chdir(&c_path).map_err(|err| Error::ChDir(target, err))
}

/// `exit`: take the whole process group down, then leave with status 0.
pub(super) fn exit_shell() -> ! {
    // the shell must survive its own SIGTERM long enough to exit normally
    if let Ok(handler) = SignalHandler::register(SIGTERM, SignalHandlerBehavior::Ignore) {
        handler.forget();
    }
    killpg(getpgrp(), SIGTERM).ok();

    std::process::exit(0)
}

#[cfg(test)]
mod tests {
    use super::cd;
    use crate::common::Error;
    use crate::system::{_exit, fork, wait::Wait, wait::WaitOptions, ForkResult};

    // `chdir` moves the whole process; run each scenario in a forked child so the test
    // runner's working directory stays put

    fn in_child(scenario: impl FnOnce() -> bool) {
        let ForkResult::Parent(child_pid) = fork().unwrap() else {
            _exit(if scenario() { 0 } else { 1 });
        };
        let (_, status) = child_pid.wait(WaitOptions::new()).unwrap();
        assert_eq!(status.exit_status(), Some(0));
    }

    #[test]
    fn cd_with_argument() {
        in_child(|| {
            cd(Some(&"/".to_string())).is_ok()
                && std::env::current_dir().unwrap() == std::path::Path::new("/")
        });
    }

    #[test]
    fn cd_without_argument_lands_in_home() {
        in_child(|| match std::env::var_os("HOME") {
            Some(home) => {
                cd(None).is_ok() && std::env::current_dir().unwrap() == std::path::PathBuf::from(home)
            }
            None => cd(None).is_err(),
        });
    }

    #[test]
    fn cd_to_missing_directory_reports_and_stays() {
        in_child(|| {
            let before = std::env::current_dir().unwrap();
            let result = cd(Some(&"/definitely/not/there".to_string()));
            matches!(result, Err(Error::ChDir(..)))
                && std::env::current_dir().unwrap() == before
        });
    }
}
