// Command Pattern for Undo/Redo
//
// Every external mutation (UI drag release, button click, MIDI event) is
// wrapped into a Command before touching the transport or the section store.
//
// Architecture:
// - UndoableCommand trait: execute(), undo(), description()
// - Command enum: one variant per mutation, carrying its own undo payload
// - CommandManager: undo/redo stacks with bounded history
// - SessionState: what commands mutate (section store + transport handle)

pub mod commands;
pub mod manager;
pub mod state;
pub mod trait_def;

pub use commands::{ActiveState, Command, PlayOrigin, PlayheadState, SPEED_RANGE, SPEED_STEP};
pub use manager::CommandManager;
pub use state::SessionState;
pub use trait_def::UndoableCommand;
