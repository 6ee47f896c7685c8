//! [`Delay`] and [`DefaultDelay`]: script timing.
//!
//! Script syntax:
//! - `DELAY 500`: pause 500 ms once
//! - `DEFAULT_DELAY 100` (or `DEFAULTDELAY 100`): pause 100 ms after every
//!   following command

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::parser::parse_millis;
use crate::sink::InjectionSink;
use async_trait::async_trait;
use std::time::Duration;

/// Pauses for a fixed duration. Replaces the default delay for its own line.
pub struct Delay {
    pub duration: Duration,
}

#[async_trait(?Send)]
impl Action for Delay {
    const NAME: &'static str = "DELAY";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        Ok(Self {
            duration: parse_millis(Self::NAME, args)?,
        })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        ctx.suspend(sink, self.duration).await
    }
}

/// Sets the pause inserted after each subsequent command.
pub struct DefaultDelay {
    pub duration: Duration,
}

#[async_trait(?Send)]
impl Action for DefaultDelay {
    const NAME: &'static str = "DEFAULT_DELAY";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        Ok(Self {
            duration: parse_millis(Self::NAME, args)?,
        })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        _sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        ctx.default_delay = self.duration;
        Ok(())
    }
}
