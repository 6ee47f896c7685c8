//! [`Led`]: toggles the status LED.
//!
//! Script syntax: `LED`

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::sink::InjectionSink;
use async_trait::async_trait;

/// Flips the context's toggle state and drives the LED to match.
pub struct Led;

#[async_trait(?Send)]
impl Action for Led {
    const NAME: &'static str = "LED";

    fn parse(_args: &str) -> Result<Self, ParseWarning> {
        Ok(Self)
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        ctx.toggle_state = !ctx.toggle_state;
        sink.set_led(ctx.toggle_state).await?;
        Ok(())
    }
}
