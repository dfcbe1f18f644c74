//! Utilities to handle signals.
use std::borrow::Cow;

use libc::c_int;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use mode::foreground_only;
pub(crate) use set::SignalSet;

mod handler;
mod mode;
mod set;

pub(crate) type SignalNumber = c_int;

macro_rules! define_consts {
    ($($signal:ident,)*) => {
        pub(crate) mod consts {
            pub(crate) use libc::{$($signal,)*};
        }

        pub(crate) fn signal_name(signal: SignalNumber) -> Cow<'static, str> {
            match signal {
                $(consts::$signal => stringify!($signal).into(),)*
                _ => format!("unknown signal #{signal}").into(),
            }
        }
    };
}

define_consts! {
    SIGINT,
    SIGQUIT,
    SIGTSTP,
    SIGTERM,
    SIGCHLD,
    SIGCONT,
    SIGKILL,
    SIGSTOP,
}
