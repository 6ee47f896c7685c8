//! Script loading and `IMPORT` resolution.
//!
//! Open scripts form an explicit stack of [`Frame`]s inside the
//! [`ExecutionContext`], each with its own line cursor. Entering a script
//! checks the stack for cycles and depth; a frame is popped when its script
//! ends or when the run unwinds.

use crate::command::Command;
use crate::context::ExecutionContext;
use crate::error::RunError;
use crate::parser::{Line, parse_line};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One open script and its read position.
pub(crate) struct Frame {
    pub(crate) path: PathBuf,
    lines: Lines<BufReader<File>>,
    pub(crate) line_no: usize,
    /// Command still to be re-executed by `REPEAT`, with the remaining count.
    pub(crate) pending_repeat: Option<(Command, u32)>,
    /// The `IMPORT` line that opened this script; `None` for the top level.
    import: Option<Command>,
}

/// What the engine should do next.
pub(crate) enum Step {
    Command(Command),
    /// A script ended. Carries the `IMPORT` command that opened it.
    Finished(Option<Command>),
}

/// Resolve an `IMPORT` target relative to the importing script's directory.
pub(crate) fn resolve(ctx: &ExecutionContext, target: &str) -> PathBuf {
    let target = Path::new(target.trim());
    if target.is_absolute() {
        return target.to_path_buf();
    }
    match ctx.frames.last().and_then(|frame| frame.path.parent()) {
        Some(dir) => dir.join(target),
        None => target.to_path_buf(),
    }
}

/// Open `path` and push it on the import stack.
pub(crate) fn enter(
    ctx: &mut ExecutionContext,
    path: &Path,
    import: Option<Command>,
) -> Result<(), RunError> {
    let canonical = fs::canonicalize(path).map_err(|e| RunError::resource(path, e))?;

    if ctx.frames.iter().any(|frame| frame.path == canonical) {
        return Err(RunError::Cycle { path: canonical });
    }
    if ctx.frames.len() >= ctx.max_depth {
        return Err(RunError::RecursionLimit {
            path: canonical,
            max_depth: ctx.max_depth,
        });
    }

    let file = File::open(&canonical).map_err(|e| RunError::resource(&canonical, e))?;
    info!(path = %canonical.display(), depth = ctx.frames.len() + 1, "executing script");
    ctx.frames.push(Frame {
        path: canonical,
        lines: BufReader::new(file).lines(),
        line_no: 0,
        pending_repeat: None,
        import,
    });
    Ok(())
}

/// Produce the next command to execute, reading lazily from the innermost
/// script. Pending repeats are drained before the next line is read.
///
/// Returns `Ok(None)` once the top-level script has finished.
pub(crate) fn next_step(ctx: &mut ExecutionContext) -> Result<Option<Step>, RunError> {
    let Some(frame) = ctx.frames.last_mut() else {
        return Ok(None);
    };

    if let Some((command, remaining)) = frame.pending_repeat.take() {
        if remaining > 1 {
            frame.pending_repeat = Some((command.clone(), remaining - 1));
        }
        return Ok(Some(Step::Command(command)));
    }

    for line in frame.lines.by_ref() {
        frame.line_no += 1;
        let line = line.map_err(|e| RunError::resource(&frame.path, e))?;
        match parse_line(&line) {
            Line::Comment => continue,
            Line::Command(command) => {
                debug!(line = frame.line_no, %command, "parsed");
                return Ok(Some(Step::Command(command)));
            }
        }
    }

    let finished = ctx.frames.pop().and_then(|frame| {
        debug!(path = %frame.path.display(), "script finished");
        frame.import
    });
    Ok(Some(Step::Finished(finished)))
}
