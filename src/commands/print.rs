//! [`Print`]: writes a message to the log; nothing is injected.
//!
//! Script syntax: `PRINT stage one done`

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::sink::InjectionSink;
use async_trait::async_trait;
use tracing::info;

pub struct Print {
    pub text: String,
}

#[async_trait(?Send)]
impl Action for Print {
    const NAME: &'static str = "PRINT";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        Ok(Self {
            text: args.to_string(),
        })
    }

    async fn execute(
        &self,
        _ctx: &mut ExecutionContext,
        _sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        info!(target: "hidscript::script", "{}", self.text);
        Ok(())
    }
}
