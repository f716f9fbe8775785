// CommandManager - Manages undo/redo stacks

use crate::command::state::SessionState;
use crate::command::trait_def::UndoableCommand;
use crate::error::CommandResult;
use std::collections::VecDeque;

/// Default maximum number of commands to keep in history
const DEFAULT_MAX_HISTORY: usize = 100;

/// Manages command execution and undo/redo functionality
///
/// The CommandManager maintains two stacks:
/// - Undo stack: Commands that have been executed and can be undone
/// - Redo stack: Commands that have been undone and can be redone
///
/// When a new command is executed:
/// 1. Execute the command
/// 2. Push it onto the undo stack
/// 3. Clear the redo stack (no redo after a new edit)
///
/// A command that fails to execute is dropped and the stacks are untouched.
///
/// # Memory Management
/// The undo stack is bounded; when the limit is reached the oldest command
/// is forgotten.
pub struct CommandManager {
    /// Commands that can be undone (most recent at the back)
    undo_stack: VecDeque<Box<dyn UndoableCommand>>,

    /// Commands that can be redone (most recent at the back)
    redo_stack: VecDeque<Box<dyn UndoableCommand>>,

    /// Maximum number of commands to keep in history
    max_history: usize,
}

impl CommandManager {
    /// Create a new CommandManager with default settings
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Create a new CommandManager with a custom history limit
    pub fn with_capacity(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_history),
            redo_stack: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Execute a command and add it to the undo stack
    ///
    /// # Errors
    /// Returns the command's validation error; nothing is recorded then.
    pub fn execute(
        &mut self,
        mut command: Box<dyn UndoableCommand>,
        state: &mut SessionState,
    ) -> CommandResult<()> {
        if let Err(err) = command.execute(state) {
            tracing::debug!("rejected '{}': {}", command.description(), err);
            return Err(err);
        }
        tracing::debug!("executed '{}'", command.description());

        self.undo_stack.push_back(command);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }

        Ok(())
    }

    /// Undo the last command
    ///
    /// Returns the description of the undone command, or `None` when there
    /// was nothing to undo.
    pub fn undo(&mut self, state: &mut SessionState) -> CommandResult<Option<String>> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        let description = command.description();

        if let Err(err) = command.undo(state) {
            tracing::warn!("undo of '{}' failed: {}", description, err);
            self.undo_stack.push_back(command);
            return Err(err);
        }
        tracing::debug!("undid '{}'", description);

        self.redo_stack.push_back(command);
        Ok(Some(description))
    }

    /// Redo the last undone command
    ///
    /// Returns the description of the redone command, or `None` when there
    /// was nothing to redo.
    pub fn redo(&mut self, state: &mut SessionState) -> CommandResult<Option<String>> {
        let Some(mut command) = self.redo_stack.pop_back() else {
            return Ok(None);
        };
        let description = command.description();

        if let Err(err) = command.execute(state) {
            tracing::warn!("redo of '{}' failed: {}", description, err);
            self.redo_stack.push_back(command);
            return Err(err);
        }
        tracing::debug!("redid '{}'", description);

        self.undo_stack.push_back(command);
        Ok(Some(description))
    }

    /// Check if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get a description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|cmd| cmd.description())
    }

    /// Get a description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|cmd| cmd.description())
    }

    /// Clear all command history (song switch)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get the number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}
