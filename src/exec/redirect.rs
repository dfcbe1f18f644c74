use std::{
    fs::File,
    io,
    os::fd::AsRawFd,
    path::Path,
};

use crate::common::Error;
use crate::cutils::cerr;

fn replace_stream(file: &File, stream: libc::c_int) -> io::Result<()> {
    // SAFETY: `dup2` cannot cause UB for any descriptor values; the duplicate loses the
    // close-on-exec flag, the original keeps it (std opens every file with `O_CLOEXEC`), so
    // only the standard stream survives the program replacement.
    cerr(unsafe { libc::dup2(file.as_raw_fd(), stream) }).map(|_| ())
}

/// Rebind the standard streams of the calling process to the given files.
///
/// Only ever called in a forked child between `fork` and `exec`; the parent's descriptors are
/// never touched. An unopenable path is fatal to that child alone.
pub(super) fn apply(stdin_file: Option<&Path>, stdout_file: Option<&Path>) -> Result<(), Error> {
    if let Some(path) = stdin_file {
        let file =
            File::open(path).map_err(|err| Error::RedirectInput(path.to_owned(), err))?;
        replace_stream(&file, libc::STDIN_FILENO)
            .map_err(|err| Error::RedirectInput(path.to_owned(), err))?;
    }

    if let Some(path) = stdout_file {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|err| Error::RedirectOutput(path.to_owned(), err))?;
        replace_stream(&file, libc::STDOUT_FILENO)
            .map_err(|err| Error::RedirectOutput(path.to_owned(), err))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::apply;
    use crate::common::Error;

    #[test]
    fn missing_input_file_is_reported() {
        let err = apply(Some("/definitely/not/there".as_ref()), None).unwrap_err();
        assert!(matches!(err, Error::RedirectInput(..)), "{err}");
    }

    #[test]
    fn unwritable_output_file_is_reported() {
        let err = apply(None, Some("/proc/no-such-entry".as_ref())).unwrap_err();
        assert!(matches!(err, Error::RedirectOutput(..)), "{err}");
    }

    #[test]
    fn child_stdout_lands_in_the_file() {
        use crate::system::{_exit, fork, wait::Wait, wait::WaitOptions, ForkResult};

        let path = std::env::temp_dir().join(format!("minsh_redirect_{}", std::process::id()));

        let ForkResult::Parent(child_pid) = fork().unwrap() else {
            if apply(None, Some(&path)).is_err() {
                _exit(1);
            }
            // write through the raw descriptor, the child never returns
            let message = b"redirected\n";
            unsafe { libc::write(libc::STDOUT_FILENO, message.as_ptr().cast(), message.len()) };
            _exit(0);
        };

        let (_, status) = child_pid.wait(WaitOptions::new()).unwrap();
        assert_eq!(status.exit_status(), Some(0));

        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(contents, "redirected\n");
    }
}
