use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    ChDir(PathBuf, io::Error),
    RedirectInput(PathBuf, io::Error),
    RedirectOutput(PathBuf, io::Error),
    Syntax(String),
    Fork(io::Error),
    Io(Option<PathBuf>, io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChDir(path, e) => {
                write!(f, "cannot change directory to '{}': {e}", path.display())
            }
            Error::RedirectInput(path, e) => {
                write!(f, "cannot open {} for input: {e}", path.display())
            }
            Error::RedirectOutput(path, e) => {
                write!(f, "cannot open {} for output: {e}", path.display())
            }
            Error::Syntax(reason) => write!(f, "syntax error: {reason}"),
            Error::Fork(e) => write!(f, "cannot fork child process: {e}"),
            Error::Io(location, e) => {
                if let Some(path) = location {
                    write!(f, "cannot execute '{}': {e}", path.display())
                } else {
                    write!(f, "IO error: {e}")
                }
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(None, err)
    }
}
