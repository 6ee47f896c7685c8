//! Maps a parsed [`Command`] to its handler.
//!
//! Every [`Keyword`] variant has exactly one arm below. Handlers that only
//! inject are run here, followed by the default delay; `REPEAT` and `IMPORT`
//! change control flow and are handed back to the engine as a [`Flow`].

use crate::command::{Action, Command, Keyword};
use crate::commands::{DefaultDelay, Delay, KeyCombo, Led, Print, Swipe, Tap, TypeString};
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::parser::parse_count;
use crate::sink::InjectionSink;
use tracing::debug;

/// What the engine must do after a command has been dispatched.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// Run `command` this many more times before reading the next line.
    Repeat(Command, u32),
    /// Open the script named by the argument.
    Import(String),
}

pub(crate) async fn dispatch(
    command: &Command,
    ctx: &mut ExecutionContext,
    sink: &mut dyn InjectionSink,
) -> Result<Flow, RunError> {
    debug!(keyword = command.keyword.name(), %command, "dispatch");
    let args = command.argument();
    let executed = match &command.keyword {
        Keyword::Delay => {
            // The explicit pause replaces the default delay for this line.
            if run::<Delay>(args, ctx, sink).await? {
                ctx.last_command = Some(command.clone());
            }
            return Ok(Flow::Continue);
        }
        Keyword::Repeat => return Ok(repeat(args, ctx)),
        Keyword::Import => {
            if args.trim().is_empty() {
                ctx.warn(ParseWarning::invalid("IMPORT", "missing script path"));
                return Ok(Flow::Continue);
            }
            return Ok(Flow::Import(args.to_string()));
        }
        Keyword::DefaultDelay => run::<DefaultDelay>(args, ctx, sink).await?,
        Keyword::String => run::<TypeString>(args, ctx, sink).await?,
        Keyword::Led => run::<Led>(args, ctx, sink).await?,
        Keyword::Swipe => run::<Swipe>(args, ctx, sink).await?,
        Keyword::Tap => run::<Tap>(args, ctx, sink).await?,
        Keyword::Print => run::<Print>(args, ctx, sink).await?,
        Keyword::Key(_) => run::<KeyCombo>(&command.raw, ctx, sink).await?,
        Keyword::Unknown(token) => {
            ctx.warn(ParseWarning::UnknownCommand(token.clone()));
            false
        }
    };

    if executed {
        ctx.last_command = Some(command.clone());
        ctx.settle(sink).await?;
    }
    Ok(Flow::Continue)
}

/// Parse and execute one handler. Returns `false` when the arguments were
/// rejected and the line was skipped.
async fn run<A: Action>(
    args: &str,
    ctx: &mut ExecutionContext,
    sink: &mut dyn InjectionSink,
) -> Result<bool, RunError> {
    match A::parse(args) {
        Ok(action) => {
            action.execute(ctx, sink).await?;
            Ok(true)
        }
        Err(warning) => {
            ctx.warn(warning);
            Ok(false)
        }
    }
}

fn repeat(args: &str, ctx: &mut ExecutionContext) -> Flow {
    let count = match parse_count("REPEAT", args) {
        Ok(count) => count,
        Err(warning) => {
            ctx.warn(warning);
            return Flow::Continue;
        }
    };
    let Some(last) = ctx.last_command.clone() else {
        ctx.warn(ParseWarning::NothingToRepeat);
        return Flow::Continue;
    };
    if count == 0 {
        ctx.warn(ParseWarning::ZeroRepeat);
        return Flow::Continue;
    }
    Flow::Repeat(last, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::event::Event;
    use crate::keymap::KeyCode;
    use crate::parser::{Line, parse_line};
    use crate::sink::RecordingSink;
    use std::time::Duration;

    fn cmd(raw: &str) -> Command {
        match parse_line(raw) {
            Line::Command(cmd) => cmd,
            Line::Comment => panic!("comment"),
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(&EngineConfig::default())
    }

    #[tokio::test]
    async fn test_every_keyword_any_case_selects_handler() {
        let lines = [
            ("delay 1", Event::sleep_ms(1)),
            ("Delay 1", Event::sleep_ms(1)),
            ("string a", Event::press(KeyCode::A)),
            ("String a", Event::press(KeyCode::A)),
            ("led", Event::Led(true)),
            ("Led", Event::Led(true)),
            ("tap 1 1", Event::Move { dx: 1, dy: 1 }),
            ("TaP 1 1", Event::Move { dx: 1, dy: 1 }),
            ("swipe 1 1 2 2 0", Event::Move { dx: 1, dy: 1 }),
            ("enter", Event::press(KeyCode::ENTER)),
            ("eNtEr", Event::press(KeyCode::ENTER)),
            ("ctrl c", Event::press(KeyCode::LEFT_CONTROL)),
        ];
        for (line, first) in lines {
            let mut ctx = ctx();
            let mut sink = RecordingSink::new();
            let flow = dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(flow, Flow::Continue, "{line}");
            assert_eq!(sink.events().first(), Some(&first), "{line}");
            assert!(ctx.diagnostics().is_empty(), "{line}");
        }
    }

    #[tokio::test]
    async fn test_control_flow_keywords_any_case() {
        for line in ["default_delay 5", "DEFAULTDELAY 5", "Default_Delay 5"] {
            let mut ctx = ctx();
            let mut sink = RecordingSink::new();
            dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(ctx.default_delay, Duration::from_millis(5), "{line}");
        }
        for line in ["import b.dd", "IMPORT b.dd", "Import b.dd"] {
            let mut ctx = ctx();
            let mut sink = RecordingSink::new();
            let flow = dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(flow, Flow::Import("b.dd".into()), "{line}");
        }
        for line in ["repeat 2", "REPEAT 2", "RePeAt 2"] {
            let mut ctx = ctx();
            let mut sink = RecordingSink::new();
            ctx.last_command = Some(cmd("ENTER"));
            let flow = dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(flow, Flow::Repeat(cmd("ENTER"), 2), "{line}");
        }
        for line in ["print hi", "PRINT hi"] {
            let mut ctx = ctx();
            let mut sink = RecordingSink::new();
            dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(ctx.last_command, Some(cmd(line)));
        }
    }

    #[tokio::test]
    async fn test_default_delay_after_command_but_not_after_delay() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::new();
        ctx.default_delay = Duration::from_millis(20);
        dispatch(&cmd("ENTER"), &mut ctx, &mut sink).await.unwrap();
        dispatch(&cmd("DELAY 100"), &mut ctx, &mut sink).await.unwrap();
        assert_eq!(
            sink.sleeps(),
            vec![Duration::from_millis(20), Duration::from_millis(100)]
        );
    }

    #[tokio::test]
    async fn test_repeat_without_previous_command() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::new();
        let flow = dispatch(&cmd("REPEAT 3"), &mut ctx, &mut sink).await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_zero_is_noop() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::new();
        ctx.last_command = Some(cmd("ENTER"));
        let flow = dispatch(&cmd("REPEAT 0"), &mut ctx, &mut sink).await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(sink.events().is_empty());
        assert_eq!(ctx.last_command, Some(cmd("ENTER")));
    }

    #[tokio::test]
    async fn test_repeat_never_becomes_last_command() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::new();
        dispatch(&cmd("TAB"), &mut ctx, &mut sink).await.unwrap();
        dispatch(&cmd("REPEAT 1"), &mut ctx, &mut sink).await.unwrap();
        assert_eq!(ctx.last_command, Some(cmd("TAB")));
    }

    #[tokio::test]
    async fn test_unknown_and_bad_arguments_are_warnings() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::new();
        for line in ["FOOBAR", "DELAY soon", "TAP 1", "STRING", "IMPORT"] {
            let flow = dispatch(&cmd(line), &mut ctx, &mut sink).await.unwrap();
            assert_eq!(flow, Flow::Continue);
        }
        assert_eq!(ctx.diagnostics().len(), 5);
        assert!(ctx.last_command.is_none());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_injection_failure_propagates() {
        let mut ctx = ctx();
        let mut sink = RecordingSink::failing_after(1);
        let err = dispatch(&cmd("ENTER"), &mut ctx, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Injection(_)));
    }
}
