//! # hidscript
//!
//! A payload interpreter for USB keyboard/mouse emulation devices.
//!
//! Payloads are small line-oriented scripts in the DuckyScript style. The
//! engine reads them one line at a time, resolves `IMPORT`s, keeps timing and
//! repeat state, and turns every command into primitive press, release, move
//! and sleep calls on an [`InjectionSink`].
//!
//! ## Quick start
//!
//! ```no_run
//! use hidscript::{Engine, HidGadgetSink};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let sink = HidGadgetSink::open("/dev/hidg0", Some(Path::new("/dev/hidg1")))?;
//!     let mut engine = Engine::new(sink);
//!
//!     let report = engine.run("/payloads/payload.dd").await;
//!     for message in report.messages() {
//!         eprintln!("{message}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Script syntax
//!
//! | Command | Description |
//! |---------|-------------|
//! | `REM text` | Comment; blank lines are ignored too |
//! | `DELAY 500` | Pause 500 ms, in place of the default delay |
//! | `DEFAULT_DELAY 100` | Pause 100 ms after every following command (`DEFAULTDELAY` also works) |
//! | `STRING text` | Type `text` character by character |
//! | `ENTER`, `TAB`, `ESC`, `UP`, ... | Press and release a single key |
//! | `GUI r`, `CTRL ALT DELETE` | Hold keys left to right, release in reverse |
//! | `REPEAT 3` | Run the previous command 3 more times |
//! | `IMPORT other.dd` | Run another script, relative to this one |
//! | `LED` | Toggle the status LED |
//! | `SWIPE x1 y1 x2 y2 ms` | Drag with the left button over `ms` milliseconds |
//! | `TAP x y` | Move and click |
//! | `PRINT text` | Write `text` to the log |
//!
//! Keywords and key names are case-insensitive. Unknown commands, unknown
//! keys and untypeable characters are reported and skipped; a missing script,
//! an import cycle or a failing sink aborts the run.
//!
//! ## Testing payloads
//!
//! [`RecordingSink`] captures every primitive without touching hardware:
//!
//! ```no_run
//! use hidscript::{Engine, Event, RecordingSink};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut engine = Engine::new(RecordingSink::new());
//!     let report = engine.run("payload.dd").await;
//!     assert!(report.completed);
//!     for event in engine.sink().events() {
//!         println!("{event}");
//!     }
//! }
//! ```
//!
//! ## Implementing a sink
//!
//! ```no_run
//! use async_trait::async_trait;
//! use hidscript::sink::{Code, InjectionSink, SinkError};
//! use std::time::Duration;
//!
//! pub struct Stdout;
//!
//! #[async_trait(?Send)]
//! impl InjectionSink for Stdout {
//!     async fn press(&mut self, code: Code) -> Result<(), SinkError> {
//!         println!("down {code}");
//!         Ok(())
//!     }
//!
//!     async fn release(&mut self, code: Code) -> Result<(), SinkError> {
//!         println!("up {code}");
//!         Ok(())
//!     }
//!
//!     async fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), SinkError> {
//!         println!("move {dx} {dy}");
//!         Ok(())
//!     }
//!
//!     async fn sleep(&mut self, duration: Duration) -> Result<(), SinkError> {
//!         tokio::time::sleep(duration).await;
//!         Ok(())
//!     }
//! }
//! ```

pub mod command;
pub mod commands;
pub mod context;
pub(crate) mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod gesture;
pub mod keymap;
pub(crate) mod loader;
pub mod parser;
pub mod settings;
pub mod sink;

pub use command::{Action, Command, Keyword};
pub use context::ExecutionContext;
pub use engine::{CancelHandle, Engine, EngineConfig, EngineState, RunReport};
pub use error::{Diagnostic, ParseWarning, RunError};
pub use event::Event;
pub use keymap::KeyCode;
pub use parser::{parse_line, parse_str};
pub use settings::{BootAction, Settings};
pub use sink::{HidGadgetSink, InjectionSink, PtySink, RecordingSink, TraceSink};
