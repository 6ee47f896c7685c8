use crate::sink::Code;
use std::fmt;
use std::time::Duration;

/// A single injection primitive, as observed by a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Press and hold a key or mouse button
    Press(Code),

    /// Release a held key or mouse button
    Release(Code),

    /// Relative pointer movement
    Move { dx: i32, dy: i32 },

    /// Pause before the next primitive
    Sleep(Duration),

    /// Status LED change
    Led(bool),

    /// Everything held was let go at once
    ReleaseAll,
}

impl Event {
    /// Create a Press event
    pub fn press(code: impl Into<Code>) -> Self {
        Event::Press(code.into())
    }

    /// Create a Release event
    pub fn release(code: impl Into<Code>) -> Self {
        Event::Release(code.into())
    }

    /// Create a Sleep event from milliseconds
    pub fn sleep_ms(ms: u64) -> Self {
        Event::Sleep(Duration::from_millis(ms))
    }

    /// Whether this is a press or release
    pub fn is_key_transition(&self) -> bool {
        matches!(self, Event::Press(_) | Event::Release(_))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Press(code) => write!(f, "press {code}"),
            Event::Release(code) => write!(f, "release {code}"),
            Event::Move { dx, dy } => write!(f, "move {dx},{dy}"),
            Event::Sleep(duration) => write!(f, "sleep {}ms", duration.as_millis()),
            Event::Led(on) => write!(f, "led {}", if *on { "on" } else { "off" }),
            Event::ReleaseAll => f.write_str("release all"),
        }
    }
}
