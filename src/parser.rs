//! Line parser for the payload scripting language.
//!
//! Scripts are executed one line at a time, so the core entry point is
//! [`parse_line`]. [`parse_str`] is a convenience for scripts already in memory.

use crate::command::{Command, Keyword};
use crate::error::ParseWarning;
use std::time::Duration;

/// The classification of one script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank or `REM` line: no action, no delay.
    Comment,
    Command(Command),
}

/// Parse a single raw script line.
///
/// The line is trimmed, and the first whitespace-delimited token becomes the
/// keyword (case-insensitive). Everything after the separating whitespace is
/// kept verbatim as the argument.
///
/// # Example
///
/// ```
/// use hidscript::parser::{Line, parse_line};
///
/// let Line::Command(cmd) = parse_line("string Hello,  world") else { panic!() };
/// assert_eq!(cmd.argument(), "Hello,  world");
/// assert_eq!(parse_line("REM setup"), Line::Comment);
/// ```
pub fn parse_line(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() || is_comment(line) {
        return Line::Comment;
    }
    let (token, argument) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, Some(rest)),
        None => (line, None),
    };
    Line::Command(Command {
        keyword: Keyword::parse(token),
        argument: argument.filter(|a| !a.is_empty()).map(str::to_string),
        raw: line.to_string(),
    })
}

/// Parse every command in `content`, dropping comments.
///
/// Unknown keywords are kept as [`Keyword::Unknown`]; they are reported when
/// dispatched.
///
/// # Example
///
/// ```
/// use hidscript::parse_str;
///
/// let commands = parse_str("REM open run dialog\nGUI r\nDELAY 500\nSTRING cmd\n");
/// assert_eq!(commands.len(), 3);
/// ```
pub fn parse_str(content: &str) -> Vec<Command> {
    content
        .lines()
        .filter_map(|line| match parse_line(line) {
            Line::Command(cmd) => Some(cmd),
            Line::Comment => None,
        })
        .collect()
}

fn is_comment(line: &str) -> bool {
    line.get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("REM"))
}

/// Parse a millisecond count: `500`.
pub(crate) fn parse_millis(keyword: &'static str, arg: &str) -> Result<Duration, ParseWarning> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(ParseWarning::invalid(keyword, "missing duration"));
    }
    arg.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ParseWarning::invalid(keyword, format!("invalid milliseconds '{arg}'")))
}

/// Parse a non-negative repeat count.
pub(crate) fn parse_count(keyword: &'static str, arg: &str) -> Result<u32, ParseWarning> {
    let arg = arg.trim();
    arg.parse::<u32>()
        .map_err(|_| ParseWarning::invalid(keyword, format!("invalid count '{arg}'")))
}

/// Parse exactly `N` whitespace-separated integers.
pub(crate) fn parse_ints<const N: usize>(
    keyword: &'static str,
    arg: &str,
) -> Result<[i32; N], ParseWarning> {
    let fields: Vec<&str> = arg.split_whitespace().collect();
    if fields.len() != N {
        return Err(ParseWarning::invalid(
            keyword,
            format!("expected {N} numbers, got {}", fields.len()),
        ));
    }
    let mut values = [0i32; N];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field
            .parse()
            .map_err(|_| ParseWarning::invalid(keyword, format!("invalid number '{field}'")))?;
    }
    Ok(values)
}
