//! Script commands: the closed [`Keyword`] set, the parsed [`Command`], and
//! the [`Action`] trait implemented by each handler in [`crate::commands`].

use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::keymap::{self, KeyCode};
use crate::sink::InjectionSink;
use async_trait::async_trait;
use std::fmt;

/// The keyword of a script line.
///
/// Every spelling a script may use maps to exactly one variant. Lines that
/// start with a key name (`ENTER`, `CTRL`, `a`, ...) become [`Keyword::Key`];
/// anything else is [`Keyword::Unknown`] and is reported, not executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    Delay,
    DefaultDelay,
    String,
    Repeat,
    Import,
    Led,
    Swipe,
    Tap,
    Print,
    Key(KeyCode),
    Unknown(String),
}

static KEYWORDS: [(&str, Keyword); 10] = [
    ("DELAY", Keyword::Delay),
    ("DEFAULT_DELAY", Keyword::DefaultDelay),
    ("DEFAULTDELAY", Keyword::DefaultDelay),
    ("STRING", Keyword::String),
    ("REPEAT", Keyword::Repeat),
    ("IMPORT", Keyword::Import),
    ("LED", Keyword::Led),
    ("SWIPE", Keyword::Swipe),
    ("TAP", Keyword::Tap),
    ("PRINT", Keyword::Print),
];

impl Keyword {
    /// Classify the first token of a line, ignoring case.
    pub fn parse(token: &str) -> Keyword {
        let upper = token.to_ascii_uppercase();
        if let Some((_, keyword)) = KEYWORDS.iter().find(|(name, _)| *name == upper) {
            return keyword.clone();
        }
        match keymap::lookup(&upper) {
            Some(code) => Keyword::Key(code),
            None => Keyword::Unknown(token.to_string()),
        }
    }

    /// Canonical spelling, used in logs and diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Keyword::Delay => "DELAY",
            Keyword::DefaultDelay => "DEFAULT_DELAY",
            Keyword::String => "STRING",
            Keyword::Repeat => "REPEAT",
            Keyword::Import => "IMPORT",
            Keyword::Led => "LED",
            Keyword::Swipe => "SWIPE",
            Keyword::Tap => "TAP",
            Keyword::Print => "PRINT",
            Keyword::Key(_) => "KEY",
            Keyword::Unknown(token) => token,
        }
    }
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub keyword: Keyword,
    /// Everything after the keyword, spacing preserved. `None` when empty.
    pub argument: Option<String>,
    /// The trimmed source line.
    pub raw: String,
}

impl Command {
    pub fn argument(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A handler for one family of commands.
///
/// `parse` turns the argument text into the handler's typed form; a failure
/// is reported as a warning and the line is skipped. `execute` issues the
/// injection primitives and may record further warnings through the context.
#[async_trait(?Send)]
pub trait Action: Sized {
    /// Keyword used in warnings about this handler's arguments.
    const NAME: &'static str;

    fn parse(args: &str) -> Result<Self, ParseWarning>;

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError>;
}
