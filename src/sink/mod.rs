//! The injection sink: where primitive keyboard and mouse events go.
//!
//! The engine only ever talks to an [`InjectionSink`]. Every call is awaited
//! before the next one is issued, so a sink sees primitives in script order.

mod hidg;
mod pty;
mod pty_reader;
mod recording;
mod trace;

pub use hidg::HidGadgetSink;
pub use pty::PtySink;
pub use recording::RecordingSink;
pub use trace::TraceSink;

use crate::keymap::KeyCode;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// A mouse button, encoded as its bit in the boot-protocol button byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
        }
    }
}

/// Anything that can be pressed and released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl From<KeyCode> for Code {
    fn from(key: KeyCode) -> Self {
        Code::Key(key)
    }
}

impl From<MouseButton> for Code {
    fn from(button: MouseButton) -> Self {
        Code::Mouse(button)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Key(key) => write!(f, "key {key}"),
            Code::Mouse(button) => write!(f, "mouse {button:?}"),
        }
    }
}

/// Failure reported by an injection sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The device cannot accept the primitive right now.
    #[error("HID device not ready: {0}")]
    NotReady(String),

    /// Writing to the underlying device failed.
    #[error("HID write failed: {0}")]
    Io(#[from] io::Error),

    /// The sink has been shut down.
    #[error("injection sink closed")]
    Closed,
}

/// Receiver of injection primitives.
///
/// Implementations must complete each primitive before returning; the
/// engine relies on that for host-side ordering.
#[async_trait(?Send)]
pub trait InjectionSink {
    async fn press(&mut self, code: Code) -> Result<(), SinkError>;

    async fn release(&mut self, code: Code) -> Result<(), SinkError>;

    /// Move the pointer by a relative offset.
    async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError>;

    /// Block for `duration`. This is the only point where a run suspends.
    async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError>;

    /// Drive the status LED. Sinks without one ignore it.
    async fn set_led(&mut self, _on: bool) -> Result<(), SinkError> {
        Ok(())
    }

    /// Let go of every held key and button.
    ///
    /// Called when a run aborts, possibly in the middle of a combo or a drag,
    /// so the next run starts with nothing held on the host.
    async fn release_all(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
