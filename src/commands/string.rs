//! [`TypeString`]: types text one character at a time.
//!
//! Script syntax: `STRING Hello, World!`

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::keymap::{KeyCode, char_to_key};
use crate::sink::InjectionSink;
use async_trait::async_trait;

/// Types `text` verbatim. Characters that need Shift are wrapped in a
/// Shift press/release; characters the layout cannot type are skipped.
pub struct TypeString {
    pub text: String,
}

#[async_trait(?Send)]
impl Action for TypeString {
    const NAME: &'static str = "STRING";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        if args.is_empty() {
            return Err(ParseWarning::invalid(Self::NAME, "missing text"));
        }
        Ok(Self {
            text: args.to_string(),
        })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        for ch in self.text.chars() {
            let Some((key, shifted)) = char_to_key(ch) else {
                ctx.warn(ParseWarning::UnsupportedChar(ch));
                continue;
            };
            if shifted {
                sink.press(KeyCode::LEFT_SHIFT.into()).await?;
            }
            sink.press(key.into()).await?;
            sink.release(key.into()).await?;
            if shifted {
                sink.release(KeyCode::LEFT_SHIFT.into()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::event::Event;
    use crate::sink::RecordingSink;

    async fn typed(text: &str) -> (Vec<Event>, ExecutionContext) {
        let mut ctx = ExecutionContext::new(&EngineConfig::default());
        let mut sink = RecordingSink::new();
        TypeString::parse(text)
            .unwrap()
            .execute(&mut ctx, &mut sink)
            .await
            .unwrap();
        (sink.take_events(), ctx)
    }

    #[tokio::test]
    async fn test_lowercase_pairs_in_order() {
        let (events, _) = typed("ab").await;
        assert_eq!(
            events,
            vec![
                Event::press(KeyCode::A),
                Event::release(KeyCode::A),
                Event::press(KeyCode(0x05)),
                Event::release(KeyCode(0x05)),
            ]
        );
    }

    #[tokio::test]
    async fn test_uppercase_wraps_shift() {
        let (events, _) = typed("A").await;
        assert_eq!(
            events,
            vec![
                Event::press(KeyCode::LEFT_SHIFT),
                Event::press(KeyCode::A),
                Event::release(KeyCode::A),
                Event::release(KeyCode::LEFT_SHIFT),
            ]
        );
    }

    #[tokio::test]
    async fn test_unsupported_char_skipped() {
        let (events, ctx) = typed("a€b").await;
        assert_eq!(events.len(), 4);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(ctx.diagnostics()[0].message.contains('€'));
    }

    #[test]
    fn test_parse_requires_text() {
        assert!(TypeString::parse("").is_err());
        assert_eq!(TypeString::parse("  two  spaces").unwrap().text, "  two  spaces");
    }
}
