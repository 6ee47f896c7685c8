use crate::context::ExecutionContext;
use crate::dispatcher::{Flow, dispatch};
use crate::error::{Diagnostic, RunError};
use crate::loader::{self, Step};
use crate::sink::InjectionSink;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default limit on nested `IMPORT`s, counting the top-level script
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 8;

/// Engine settings that stay fixed across runs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of scripts open at once
    pub max_import_depth: usize,
    /// Default delay each run starts with
    pub initial_default_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
            initial_default_delay: Duration::ZERO,
        }
    }
}

/// Lifecycle of the engine.
///
/// `Idle -> Running` when a run starts; `Running <-> Suspended` around every
/// timed wait; `Running -> Completed | Aborted` when it ends; then back to
/// `Idle`.
///
/// [`Engine::state`] tracks the run as a whole and never reports
/// `Suspended`. Waits happen inside handlers, so `Suspended` is only visible
/// through [`ExecutionContext::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Suspended,
    Completed,
    Aborted,
}

impl EngineState {
    pub fn can_transition_to(self, next: EngineState) -> bool {
        use EngineState::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Suspended)
                | (Suspended, Running)
                | (Running, Completed)
                | (Running, Aborted)
                | (Completed, Idle)
                | (Aborted, Idle)
        )
    }
}

/// Requests cancellation of the current run from outside it
///
/// Cloneable and thread-safe; a button handler can hold one while the run
/// is in progress. The request takes effect before the next command.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of one run, for the menu to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub completed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}

/// The payload engine: runs scripts against an injection sink
pub struct Engine<S> {
    sink: S,
    config: EngineConfig,
    state: EngineState,
    cancel: CancelHandle,
}

impl<S: InjectionSink> Engine<S> {
    /// Create an engine with default settings
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, EngineConfig::default())
    }

    pub fn with_config(sink: S, config: EngineConfig) -> Self {
        Engine {
            sink,
            config,
            state: EngineState::Idle,
            cancel: CancelHandle::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// A handle that can cancel runs of this engine
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel the current run before its next command
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Execute the script at `path`, including everything it imports
    ///
    /// Never fails: problems are returned as diagnostics, and
    /// `completed` is `false` when the run was aborted.
    pub async fn run(&mut self, path: impl AsRef<Path>) -> RunReport {
        let path = path.as_ref();
        self.cancel.reset();
        self.transition(EngineState::Running);
        info!(path = %path.display(), "payload started");

        let mut ctx = ExecutionContext::new(&self.config);
        let outcome = self.execute(&mut ctx, path).await;
        debug_assert_ne!(ctx.phase(), EngineState::Suspended);

        let completed = match outcome {
            Ok(()) => {
                self.transition(EngineState::Completed);
                info!(path = %path.display(), "payload completed");
                true
            }
            Err(err) => {
                let stack: Vec<_> = ctx.import_stack().map(Path::display).collect();
                error!(path = %path.display(), depth = stack.len(), "payload aborted: {err}");
                for script in stack.iter().rev() {
                    debug!("  in {script}");
                }
                ctx.report(err.to_string());
                ctx.unwind();
                // The abort may have come mid-combo or mid-drag.
                if let Err(err) = self.sink.release_all().await {
                    warn!("failed to release held keys: {err}");
                }
                self.transition(EngineState::Aborted);
                false
            }
        };

        let diagnostics = ctx.into_diagnostics();
        self.transition(EngineState::Idle);
        RunReport {
            completed,
            diagnostics,
        }
    }

    /// Drive the frame stack until the top-level script ends
    async fn execute(&mut self, ctx: &mut ExecutionContext, path: &Path) -> Result<(), RunError> {
        loader::enter(ctx, path, None)?;

        while let Some(step) = loader::next_step(ctx)? {
            match step {
                Step::Command(command) => {
                    // Lets a canceller on the same thread run between commands.
                    tokio::task::yield_now().await;
                    if self.cancel.is_cancelled() {
                        return Err(RunError::Cancelled);
                    }
                    match dispatch(&command, ctx, &mut self.sink).await? {
                        Flow::Continue => {}
                        Flow::Repeat(last, count) => {
                            if let Some(frame) = ctx.frames.last_mut() {
                                frame.pending_repeat = Some((last, count));
                            }
                        }
                        Flow::Import(target) => {
                            let resolved = loader::resolve(ctx, &target);
                            loader::enter(ctx, &resolved, Some(command))?;
                        }
                    }
                }
                // An imported script ended: the IMPORT line itself is done.
                Step::Finished(Some(import)) => {
                    ctx.last_command = Some(import);
                    ctx.settle(&mut self.sink).await?;
                }
                Step::Finished(None) => {}
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: EngineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {next:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "engine state");
        self.state = next;
    }
}
