//! Per-run mutable state shared by every handler and every imported script.

use crate::command::Command;
use crate::engine::{EngineConfig, EngineState};
use crate::error::{Diagnostic, ParseWarning, RunError};
use crate::loader::Frame;
use crate::sink::InjectionSink;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// State owned by a single top-level run.
///
/// A fresh context is created for each run and dropped when the run ends, so
/// nothing carries over between runs. Imported scripts share the context of
/// the script that imported them.
pub struct ExecutionContext {
    /// Pause inserted after each command other than `DELAY`.
    pub default_delay: Duration,
    /// Most recent command other than `REPEAT`; the target of `REPEAT`.
    pub last_command: Option<Command>,
    /// Current `LED` toggle.
    pub toggle_state: bool,
    pub(crate) frames: Vec<Frame>,
    pub(crate) max_depth: usize,
    pub(crate) phase: EngineState,
    diagnostics: Vec<Diagnostic>,
}

impl ExecutionContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_delay: config.initial_default_delay,
            last_command: None,
            toggle_state: false,
            frames: Vec::new(),
            max_depth: config.max_import_depth,
            phase: EngineState::Running,
            diagnostics: Vec::new(),
        }
    }

    /// Paths of the scripts being executed, outermost first.
    pub fn import_stack(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(|frame| frame.path.as_path())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn phase(&self) -> EngineState {
        self.phase
    }

    /// Record a recoverable problem against the line being executed.
    pub fn warn(&mut self, warning: ParseWarning) {
        self.report(warning.to_string());
    }

    pub(crate) fn report(&mut self, message: String) {
        let diagnostic = match self.frames.last() {
            Some(frame) => Diagnostic::new(Some(frame.path.clone()), frame.line_no, message),
            None => Diagnostic::new(None, 0, message),
        };
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Wait for `duration` through the sink. The run is suspended until the
    /// sink returns.
    pub async fn suspend(
        &mut self,
        sink: &mut dyn InjectionSink,
        duration: Duration,
    ) -> Result<(), RunError> {
        self.phase = EngineState::Suspended;
        let slept = sink.sleep(duration).await;
        self.phase = EngineState::Running;
        Ok(slept?)
    }

    /// The pause that follows a command, if a default delay is set.
    pub async fn settle(&mut self, sink: &mut dyn InjectionSink) -> Result<(), RunError> {
        if self.default_delay.is_zero() {
            return Ok(());
        }
        self.suspend(sink, self.default_delay).await
    }

    /// Close every open script, innermost first.
    pub(crate) fn unwind(&mut self) {
        while let Some(frame) = self.frames.pop() {
            debug!(path = %frame.path.display(), line = frame.line_no, "closing script");
        }
    }
}
