//! Turning `argv` into a command, a help request, or a usage error
//!
//! Help short-circuits everything else: it is detected before clap sees the
//! arguments, so `--help` wins even next to otherwise invalid input. Every
//! usage error carries the `Usage:` line, whichever clap error produced it.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

/// How a front end's operands are laid out
///
/// This decides where a help flag is honoured, which tokens are refused as
/// flags before clap sees them, and what the hint for a stray flag suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentLayout {
    /// Options and file operands, mixed freely up to a `--` separator
    Files,
    /// A command line to run; only the first argument is ours
    Command,
}

impl ArgumentLayout {
    /// Hint appended when a token that looks like a flag was not one
    pub fn hint(self, arg: &str) -> String {
        let operand = match self {
            Self::Files => "file name",
            Self::Command => "program name",
        };
        format!("If you meant a {}, use \"./{}\".", operand, arg)
    }
}

/// Outcome of parsing one command line
#[derive(Debug)]
pub enum Parsed<T> {
    /// Arguments are valid
    Run(T),
    /// Help was requested; print this to stdout and exit 0
    Help(String),
    /// Arguments are invalid; print this to stderr and exit 1
    Usage(String),
}

fn is_help_flag(arg: &OsStr) -> bool {
    arg == "-h" || arg == "--help"
}

/// Whether `args` (program name excluded) ask for help
pub fn help_requested(args: &[OsString], layout: ArgumentLayout) -> bool {
    match layout {
        ArgumentLayout::Files => args
            .iter()
            .take_while(|arg| arg.as_os_str() != "--")
            .any(|arg| is_help_flag(arg)),
        ArgumentLayout::Command => args.first().is_some_and(|arg| is_help_flag(arg)),
    }
}

/// A token clap would take as an operand but that has a leading `-`
///
/// For files that is a lone `-` before any `--`. For a command it is a
/// first argument that starts with `-`, since the child's own flags are
/// passed through untouched.
fn stray_flag(args: &[OsString], layout: ArgumentLayout) -> Option<&OsStr> {
    match layout {
        ArgumentLayout::Files => args
            .iter()
            .map(OsString::as_os_str)
            .take_while(|arg| *arg != "--")
            .find(|arg| *arg == "-"),
        ArgumentLayout::Command => args
            .first()
            .map(OsString::as_os_str)
            .filter(|arg| *arg != "--" && arg.as_bytes().starts_with(b"-")),
    }
}

fn with_usage<T: CommandFactory>(message: String) -> String {
    if message.contains("Usage:") {
        return message;
    }
    format!("{}\n\n{}\n", message.trim_end(), T::command().render_usage())
}

fn with_hint(message: String, arg: Option<&str>, layout: ArgumentLayout) -> String {
    match arg {
        Some(arg) if arg.starts_with('-') => {
            format!("{}\n{}\n", message.trim_end(), layout.hint(arg))
        }
        _ => message,
    }
}

fn offending_argument(error: &clap::Error) -> Option<&str> {
    match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.as_str()),
        _ => None,
    }
}

/// Render `T`'s help text
pub fn help_text<T: CommandFactory>() -> String {
    T::command().render_help().to_string()
}

/// Usage error for a token that was taken for a flag
pub fn unknown_flag<T: CommandFactory>(arg: &str, layout: ArgumentLayout) -> String {
    let error = T::command().error(
        ErrorKind::UnknownArgument,
        format!("unexpected argument '{}' found", arg),
    );
    with_hint(with_usage::<T>(error.to_string()), Some(arg), layout)
}

/// Parse a full command line (program name first)
pub fn parse_args<T: Parser>(args: Vec<OsString>, layout: ArgumentLayout) -> Parsed<T> {
    let operands = args.get(1..).unwrap_or_default();
    if help_requested(operands, layout) {
        return Parsed::Help(help_text::<T>());
    }
    if let Some(arg) = stray_flag(operands, layout) {
        return Parsed::Usage(unknown_flag::<T>(&arg.to_string_lossy(), layout));
    }

    match T::try_parse_from(args) {
        Ok(parsed) => Parsed::Run(parsed),
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Parsed::Help(error.to_string()),
            ErrorKind::UnknownArgument => Parsed::Usage(with_hint(
                with_usage::<T>(error.to_string()),
                offending_argument(&error),
                layout,
            )),
            _ => Parsed::Usage(with_usage::<T>(error.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{CopyCli, CopyCommand, JsonTimeCli, ReadWriteCli};
    use rstest::rstest;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn usage_text<T: std::fmt::Debug>(parsed: Parsed<T>) -> String {
        match parsed {
            Parsed::Usage(text) => text,
            other => panic!("expected a usage error, got {:?}", other),
        }
    }

    #[rstest]
    #[case(&["--help"], true)]
    #[case(&["-h"], true)]
    #[case(&["a", "b", "--help"], true)]
    #[case(&["--bogus", "-h"], true)]
    #[case(&["a", "--", "--help"], false)]
    #[case(&["a", "b"], false)]
    #[case(&["--helpful"], false)]
    fn test_help_anywhere(#[case] args: &[&str], #[case] expected: bool) {
        assert_eq!(help_requested(&argv(args), ArgumentLayout::Files), expected);
    }

    #[rstest]
    #[case(&["--help"], true)]
    #[case(&["-h", "ls"], true)]
    #[case(&["ls", "--help"], false)]
    #[case(&[], false)]
    fn test_help_first_argument(#[case] args: &[&str], #[case] expected: bool) {
        assert_eq!(help_requested(&argv(args), ArgumentLayout::Command), expected);
    }

    #[rstest]
    #[case(&["-", "b.txt"], ArgumentLayout::Files, Some("-"))]
    #[case(&["a.txt", "-"], ArgumentLayout::Files, Some("-"))]
    #[case(&["--", "-", "b.txt"], ArgumentLayout::Files, None)]
    #[case(&["a.txt", "b.txt"], ArgumentLayout::Files, None)]
    #[case(&["-x"], ArgumentLayout::Command, Some("-x"))]
    #[case(&["-"], ArgumentLayout::Command, Some("-"))]
    #[case(&["sh", "-c", "-"], ArgumentLayout::Command, None)]
    #[case(&["--", "ls"], ArgumentLayout::Command, None)]
    fn test_stray_flag(
        #[case] args: &[&str],
        #[case] layout: ArgumentLayout,
        #[case] expected: Option<&str>,
    ) {
        let args = argv(args);
        assert_eq!(
            stray_flag(&args, layout).and_then(OsStr::to_str),
            expected
        );
    }

    #[test]
    fn test_help_wins_over_bad_arguments() {
        let parsed = parse_args::<ReadWriteCli>(
            argv(&["read-write", "--buffer", "0", "--help"]),
            ArgumentLayout::Files,
        );
        match parsed {
            Parsed::Help(text) => assert!(text.contains("--buffer")),
            other => panic!("expected help, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_arguments() {
        let parsed =
            parse_args::<CopyCli>(argv(&["copy", "a.txt", "b.txt"]), ArgumentLayout::Files);
        match parsed {
            Parsed::Run(cli) => {
                assert_eq!(cli.files().source.to_str(), Some("a.txt"));
                assert_eq!(cli.files().destination.to_str(), Some("b.txt"));
            }
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_dashed_path_after_separator() {
        let parsed = parse_args::<CopyCli>(argv(&["copy", "--", "-", "b.txt"]), ArgumentLayout::Files);
        match parsed {
            Parsed::Run(cli) => assert_eq!(cli.files().source.to_str(), Some("-")),
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[rstest]
    #[case(&["copy"])]
    #[case(&["copy", "a.txt"])]
    #[case(&["copy", "a.txt", "b.txt", "c.txt"])]
    fn test_wrong_positional_count(#[case] args: &[&str]) {
        let text = usage_text(parse_args::<CopyCli>(argv(args), ArgumentLayout::Files));
        assert!(text.contains("Usage:"), "{}", text);
    }

    #[rstest]
    #[case("0", "at least 1")]
    #[case("-1", "at least 1")]
    #[case("lots", "not a valid integer argument for --buffer")]
    fn test_bad_buffer(#[case] value: &str, #[case] message: &str) {
        let text = usage_text(parse_args::<ReadWriteCli>(
            argv(&["read-write", "--buffer", value, "a", "b"]),
            ArgumentLayout::Files,
        ));
        assert!(text.contains(message), "{}", text);
        assert!(text.contains("Usage: read-write"), "{}", text);
    }

    #[test]
    fn test_missing_buffer_value_shows_usage() {
        let text = usage_text(parse_args::<ReadWriteCli>(
            argv(&["read-write", "a", "b", "--buffer"]),
            ArgumentLayout::Files,
        ));
        assert!(text.contains("--buffer"), "{}", text);
        assert!(text.contains("Usage: read-write"), "{}", text);
    }

    #[test]
    fn test_unknown_flag_gets_file_name_hint() {
        let text = usage_text(parse_args::<CopyCli>(
            argv(&["copy", "--bogus", "a.txt", "b.txt"]),
            ArgumentLayout::Files,
        ));
        assert!(text.contains("If you meant a file name, use \"./--bogus\"."));
        assert!(text.contains("Usage: copy"), "{}", text);
    }

    #[test]
    fn test_lone_dash_is_a_flag() {
        let text = usage_text(parse_args::<CopyCli>(
            argv(&["copy", "-", "b.txt"]),
            ArgumentLayout::Files,
        ));
        assert!(text.contains("'-'"), "{}", text);
        assert!(text.contains("Usage: copy"), "{}", text);
        assert!(text.ends_with("If you meant a file name, use \"./-\".\n"));
    }

    #[test]
    fn test_jsontime_help_only_first() {
        let parsed = parse_args::<JsonTimeCli>(
            argv(&["jsontime", "ls", "--help"]),
            ArgumentLayout::Command,
        );
        match parsed {
            Parsed::Run(cli) => assert_eq!(cli.command, argv(&["ls", "--help"])),
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_jsontime_requires_command() {
        let text = usage_text(parse_args::<JsonTimeCli>(
            argv(&["jsontime"]),
            ArgumentLayout::Command,
        ));
        assert!(text.contains("Usage: jsontime"), "{}", text);
    }

    #[test]
    fn test_jsontime_flag_gets_program_name_hint() {
        let text = usage_text(parse_args::<JsonTimeCli>(
            argv(&["jsontime", "-x", "ls"]),
            ArgumentLayout::Command,
        ));
        assert!(text.contains("'-x'"), "{}", text);
        assert!(text.ends_with("If you meant a program name, use \"./-x\".\n"));
        assert!(!text.contains("file name"), "{}", text);
    }

    #[rstest]
    #[case(ArgumentLayout::Files, "If you meant a file name, use \"./-x\".")]
    #[case(ArgumentLayout::Command, "If you meant a program name, use \"./-x\".")]
    fn test_hint(#[case] layout: ArgumentLayout, #[case] expected: &str) {
        assert_eq!(layout.hint("-x"), expected);
    }
}
