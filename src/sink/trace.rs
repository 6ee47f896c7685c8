//! [`TraceSink`]: logs primitives instead of injecting them.

use super::{Code, InjectionSink, SinkError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Logs each primitive at info level.
///
/// With `dry_run` set, sleeps are logged but skipped so a long payload can be
/// checked in a moment.
#[derive(Debug, Default)]
pub struct TraceSink {
    dry_run: bool,
    primitives: u64,
}

impl TraceSink {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            primitives: 0,
        }
    }

    /// Number of primitives seen so far.
    pub fn primitives(&self) -> u64 {
        self.primitives
    }
}

#[async_trait(?Send)]
impl InjectionSink for TraceSink {
    async fn press(&mut self, code: Code) -> Result<(), SinkError> {
        self.primitives += 1;
        info!(target: "hidscript::inject", "press {code}");
        Ok(())
    }

    async fn release(&mut self, code: Code) -> Result<(), SinkError> {
        self.primitives += 1;
        info!(target: "hidscript::inject", "release {code}");
        Ok(())
    }

    async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        self.primitives += 1;
        info!(target: "hidscript::inject", dx, dy, "move");
        Ok(())
    }

    async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError> {
        self.primitives += 1;
        info!(target: "hidscript::inject", ms = duration.as_millis() as u64, "sleep");
        if !self.dry_run {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }

    async fn set_led(&mut self, on: bool) -> Result<(), SinkError> {
        info!(target: "hidscript::inject", on, "led");
        Ok(())
    }

    async fn release_all(&mut self) -> Result<(), SinkError> {
        self.primitives += 1;
        info!(target: "hidscript::inject", "release all");
        Ok(())
    }
}
