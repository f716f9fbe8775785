// MIDI - Controller input, parsing and command routing

pub mod event;
pub mod input;
pub mod router;

pub use event::{CONTROL_PRESS_THRESHOLD, MidiEvent, MidiTrigger};
pub use input::{MidiInput, MidiInputError};
pub use router::{MidiAction, MidiBinding, MidiEventRouter, MidiMapping, Routed};
