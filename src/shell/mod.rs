#![forbid(unsafe_code)]

use std::io::{self, Write};

use crate::{
    common::Error,
    exec::{self, ExitReason},
    log::{dev_info, dev_warn, user_error, user_warn},
    parse::{parse_command_line, CommandLine},
    system::{
        process_id,
        signal::{consts::*, foreground_only, SignalHandler, SignalHandlerBehavior, SignalSet},
    },
};

mod builtins;

pub fn main() {
    crate::log::ShellLogger::new("minsh: ").into_global_logger();

    dev_info!("development logs are enabled");

    match run_loop() {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            user_error!("{err}");
            std::process::exit(1);
        }
    }
}

fn run_loop() -> Result<(), Error> {
    install_dispositions()?;

    let shell_pid = process_id();
    let mut last_foreground = ExitReason::Code(0);

    let mut line = String::new();
    loop {
        // background children that finished since the last cycle are announced ahead of the
        // prompt, each exactly once
        report_finished();

        let mut stdout = io::stdout();
        let _ = write!(stdout, ": ");
        let _ = stdout.flush();

        line.clear();
        match io::stdin().read_line(&mut line) {
            // end of input leaves the loop like `exit`, minus the process-group sweep
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }

        let cmdline = match parse_command_line(&line, shell_pid) {
            Ok(Some(cmdline)) => cmdline,
            Ok(None) => continue,
            Err(err) => {
                user_error!("{err}");
                continue;
            }
        };

        match cmdline.arguments[0].as_str() {
            "cd" => {
                if let Err(err) = builtins::cd(cmdline.arguments.get(1)) {
                    user_error!("{err}");
                }
            }
            "status" => println_ignore_io_error!("{last_foreground}"),
            "exit" => builtins::exit_shell(),
            _ => run_external(&cmdline, &mut last_foreground)?,
        }
    }

    Ok(())
}

/// The shell shrugs off Ctrl-C for its own lifetime; Ctrl-Z drives the foreground-only toggle.
/// Children put the default Ctrl-C action back before their exec (see [`exec::spawn_command`]).
fn install_dispositions() -> Result<(), Error> {
    // hold every signal back until both dispositions are in place, so a Ctrl-Z cannot slip in
    // half-configured
    let original_set = match SignalSet::full().and_then(|set| set.block()) {
        Ok(set) => Some(set),
        Err(err) => {
            dev_warn!("cannot block signals: {err}");
            None
        }
    };

    SignalHandler::register(SIGINT, SignalHandlerBehavior::Ignore)?.forget();
    SignalHandler::register(SIGTSTP, SignalHandlerBehavior::ToggleForegroundOnly)?.forget();

    if let Some(set) = original_set {
        if let Err(err) = set.set_mask() {
            dev_warn!("cannot restore signal mask: {err}");
        }
    }

    Ok(())
}

fn run_external(cmdline: &CommandLine, last_foreground: &mut ExitReason) -> Result<(), Error> {
    // losing `fork` is fatal to the whole shell
    let child_pid = exec::spawn_command(cmdline).map_err(Error::Fork)?;

    // the command's `&` is honored only while the mode is normal; a demoted command runs in the
    // foreground with no notice
    if cmdline.background && !foreground_only() {
        match exec::try_reap(child_pid) {
            // it finished before we could even look; still report it exactly once
            Ok(Some(reason)) => {
                println_ignore_io_error!("background pid {child_pid} is done: {reason}")
            }
            Ok(None) => println_ignore_io_error!("background pid is {child_pid}"),
            Err(err) => user_warn!("cannot poll background child {child_pid}: {err}"),
        }
    } else {
        match exec::wait_foreground(child_pid) {
            Ok(reason) => *last_foreground = reason,
            Err(err) => user_warn!("cannot wait for {child_pid}: {err}"),
        }
    }

    report_finished();

    Ok(())
}

fn report_finished() {
    for (pid, reason) in exec::reap_finished() {
        println_ignore_io_error!("background pid {pid} is done: {reason}");
    }
}
