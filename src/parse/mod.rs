#![forbid(unsafe_code)]

use std::path::PathBuf;

use crate::common::Error;
use crate::system::interface::ProcessId;

/// One tokenized input line, built fresh for every prompt cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandLine {
    /// Program name first, then its arguments.
    pub(crate) arguments: Vec<String>,
    pub(crate) stdin_file: Option<PathBuf>,
    pub(crate) stdout_file: Option<PathBuf>,
    pub(crate) background: bool,
}

/// Tokenize one input line.
///
/// Returns `Ok(None)` for a blank line or a `#` comment. Every occurrence of `$$` in a token
/// expands to the shell's own process ID, redirect targets included.
pub(crate) fn parse_command_line(
    line: &str,
    shell_pid: ProcessId,
) -> Result<Option<CommandLine>, Error> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        None => return Ok(None),
        Some(first) if first.starts_with('#') => return Ok(None),
        _ => {}
    }

    // `&` requests a background run only as the final token of the line; anywhere else it is an
    // ordinary argument
    let background = tokens.last() == Some(&"&");
    if background {
        tokens.pop();
    }

    let pid = shell_pid.to_string();
    let expand = |token: &str| token.replace("$$", &pid);

    let mut arguments = Vec::new();
    let mut stdin_file = None;
    let mut stdout_file = None;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match token {
            "<" => match iter.next() {
                Some(path) => stdin_file = Some(PathBuf::from(expand(path))),
                None => return Err(Error::Syntax("expected a path after '<'".to_string())),
            },
            ">" => match iter.next() {
                Some(path) => stdout_file = Some(PathBuf::from(expand(path))),
                None => return Err(Error::Syntax("expected a path after '>'".to_string())),
            },
            _ => arguments.push(expand(token)),
        }
    }

    if arguments.is_empty() {
        return Err(Error::Syntax("missing command name".to_string()));
    }

    Ok(Some(CommandLine {
        arguments,
        stdin_file,
        stdout_file,
        background,
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{parse_command_line, CommandLine};
    use crate::{common::Error, system::interface::ProcessId};

    const PID: ProcessId = ProcessId(4567);

    fn parse(line: &str) -> Option<CommandLine> {
        parse_command_line(line, PID).unwrap()
    }

    fn args(arguments: &[&str]) -> Vec<String> {
        arguments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_and_comment_lines_are_noops() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \t  "), None);
        assert_eq!(parse("# a comment"), None);
        assert_eq!(parse("#ls -la"), None);
    }

    #[test]
    fn plain_command() {
        assert_eq!(
            parse("ls -la /tmp"),
            Some(CommandLine {
                arguments: args(&["ls", "-la", "/tmp"]),
                stdin_file: None,
                stdout_file: None,
                background: false,
            })
        );
    }

    #[test]
    fn redirects_are_order_independent() {
        let expected = Some(CommandLine {
            arguments: args(&["sort"]),
            stdin_file: Some("in.txt".into()),
            stdout_file: Some("out.txt".into()),
            background: false,
        });

        assert_eq!(parse("sort < in.txt > out.txt"), expected);
        assert_eq!(parse("sort > out.txt < in.txt"), expected);
    }

    #[test]
    fn repeated_redirect_overwrites() {
        let cmdline = parse("cat < a.txt < b.txt").unwrap();
        assert_eq!(cmdline.stdin_file, Some("b.txt".into()));
    }

    #[test]
    fn trailing_ampersand_requests_background() {
        let cmdline = parse("sleep 5 &").unwrap();
        assert_eq!(cmdline.arguments, args(&["sleep", "5"]));
        assert!(cmdline.background);
    }

    #[test]
    fn embedded_ampersand_is_an_argument() {
        let cmdline = parse("echo a & b").unwrap();
        assert_eq!(cmdline.arguments, args(&["echo", "a", "&", "b"]));
        assert!(!cmdline.background);
    }

    #[test]
    fn background_with_redirection() {
        let cmdline = parse("wc -l < in.txt > out.txt &").unwrap();
        assert_eq!(cmdline.arguments, args(&["wc", "-l"]));
        assert_eq!(cmdline.stdin_file, Some("in.txt".into()));
        assert_eq!(cmdline.stdout_file, Some("out.txt".into()));
        assert!(cmdline.background);
    }

    #[test]
    fn pid_marker_expands_in_every_token() {
        let cmdline = parse("echo hello$$world > log.$$").unwrap();
        assert_eq!(cmdline.arguments, args(&["echo", "hello4567world"]));
        assert_eq!(cmdline.stdout_file, Some("log.4567".into()));

        let cmdline = parse("echo $$$$").unwrap();
        assert_eq!(cmdline.arguments, args(&["echo", "45674567"]));
    }

    #[test]
    fn missing_redirect_path_is_a_syntax_error() {
        for line in ["cat <", "cat >", "<"] {
            let err = parse_command_line(line, PID).unwrap_err();
            assert!(matches!(err, Error::Syntax(_)), "{line}: {err}");
        }
    }

    #[test]
    fn line_with_only_redirections_has_no_command() {
        let err = parse_command_line("< in.txt", PID).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }
}
