//! [`RecordingSink`]: keeps every primitive in memory instead of injecting it.

use super::{Code, InjectionSink, SinkError};
use crate::event::Event;
use async_trait::async_trait;
use std::time::Duration;

/// Records primitives as [`Event`]s. Sleeps are recorded, not performed.
///
/// Useful for tests and for previewing what a payload would do. A sink built
/// with [`RecordingSink::failing_after`] rejects every primitive past the
/// given count, the way an unplugged HID device would.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<Event>,
    fail_after: Option<usize>,
    led: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `limit` primitives, then report the device as not ready.
    pub fn failing_after(limit: usize) -> Self {
        Self {
            fail_after: Some(limit),
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Only presses and releases, in order.
    pub fn key_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.is_key_transition())
            .cloned()
            .collect()
    }

    /// Durations of every recorded sleep, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn led(&self) -> bool {
        self.led
    }

    fn record(&mut self, event: Event) -> Result<(), SinkError> {
        if let Some(limit) = self.fail_after {
            if self.events.len() >= limit {
                return Err(SinkError::NotReady(format!("rejected {event}")));
            }
        }
        self.events.push(event);
        Ok(())
    }
}

#[async_trait(?Send)]
impl InjectionSink for RecordingSink {
    async fn press(&mut self, code: Code) -> Result<(), SinkError> {
        self.record(Event::Press(code))
    }

    async fn release(&mut self, code: Code) -> Result<(), SinkError> {
        self.record(Event::Release(code))
    }

    async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
        self.record(Event::Move { dx, dy })
    }

    async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError> {
        self.record(Event::Sleep(duration))
    }

    async fn set_led(&mut self, on: bool) -> Result<(), SinkError> {
        self.record(Event::Led(on))?;
        self.led = on;
        Ok(())
    }

    async fn release_all(&mut self) -> Result<(), SinkError> {
        self.record(Event::ReleaseAll)
    }
}
