//! [`KeyCombo`]: single keys and modifier shortcuts.
//!
//! Script syntax: `ENTER`, `GUI r`, `CTRL ALT DELETE`, `ALT F4`

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::keymap::{self, KeyCode};
use crate::sink::InjectionSink;
use async_trait::async_trait;

/// Presses every key left to right, then releases them in reverse order.
///
/// Parsed from the whole line, since the keyword itself is the first key.
/// Tokens that name no key are remembered and reported when executed.
pub struct KeyCombo {
    pub keys: Vec<KeyCode>,
    pub unknown: Vec<String>,
}

#[async_trait(?Send)]
impl Action for KeyCombo {
    const NAME: &'static str = "KEY";

    fn parse(line: &str) -> Result<Self, ParseWarning> {
        let mut keys = Vec::new();
        let mut unknown = Vec::new();
        for token in line.split_whitespace() {
            match keymap::lookup(token) {
                Some(key) => keys.push(key),
                None => unknown.push(token.to_string()),
            }
        }
        if keys.is_empty() {
            return Err(ParseWarning::UnknownKey(line.trim().to_string()));
        }
        Ok(Self { keys, unknown })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        for token in &self.unknown {
            ctx.warn(ParseWarning::UnknownKey(token.clone()));
        }
        for key in &self.keys {
            sink.press((*key).into()).await?;
        }
        for key in self.keys.iter().rev() {
            sink.release((*key).into()).await?;
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

    async fn run(line: &str) -> (Vec<Event>, ExecutionContext) {
        let mut ctx = ExecutionContext::new(&EngineConfig::default());
        let mut sink = RecordingSink::new();
        KeyCombo::parse(line)
            .unwrap()
            .execute(&mut ctx, &mut sink)
            .await
            .unwrap();
        (sink.take_events(), ctx)
    }

    #[tokio::test]
    async fn test_ctrl_l_order() {
        let (events, _) = run("CTRL l").await;
        assert_eq!(
            events,
            vec![
                Event::press(KeyCode::LEFT_CONTROL),
                Event::press(KeyCode::L),
                Event::release(KeyCode::L),
                Event::release(KeyCode::LEFT_CONTROL),
            ]
        );
    }

    #[tokio::test]
    async fn test_three_key_release_is_reversed() {
        let (events, _) = run("ctrl alt delete").await;
        assert_eq!(
            events,
            vec![
                Event::press(KeyCode::LEFT_CONTROL),
                Event::press(KeyCode::LEFT_ALT),
                Event::press(KeyCode::DELETE),
                Event::release(KeyCode::DELETE),
                Event::release(KeyCode::LEFT_ALT),
                Event::release(KeyCode::LEFT_CONTROL),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_key() {
        let (events, _) = run("ENTER").await;
        assert_eq!(
            events,
            vec![Event::press(KeyCode::ENTER), Event::release(KeyCode::ENTER)]
        );
    }

    #[tokio::test]
    async fn test_unknown_token_skipped() {
        let (events, ctx) = run("GUI bogus r").await;
        assert_eq!(events.len(), 4);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(ctx.diagnostics()[0].message.contains("bogus"));
    }

    #[test]
    fn test_no_known_keys() {
        assert!(matches!(
            KeyCombo::parse("nothing here"),
            Err(ParseWarning::UnknownKey(_))
        ));
    }
}
