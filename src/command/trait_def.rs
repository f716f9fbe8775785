// UndoableCommand trait definition

use crate::command::state::SessionState;
use crate::error::CommandResult;

/// Trait for commands that support undo/redo
///
/// Commands run on the UI context. `execute` must validate before writing
/// anything, so a rejected command leaves the session untouched, and must
/// capture whatever `undo` needs to restore the prior state exactly.
///
/// # Thread Safety
/// Commands must be Send as they may be built on the MIDI thread.
pub trait UndoableCommand: Send {
    /// Apply the command, storing the previous state internally
    fn execute(&mut self, state: &mut SessionState) -> CommandResult<()>;

    /// Restore the state captured by the last `execute`
    fn undo(&mut self, state: &mut SessionState) -> CommandResult<()>;

    /// Human-readable description (e.g. "Undo: Seek to 00:12.5")
    fn description(&self) -> String;
}
