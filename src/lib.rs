// Practice Transport - Library exports for the binary, tests and benchmarks

pub mod clock;
pub mod command;
pub mod error;
pub mod messaging;
pub mod midi;
pub mod section;
pub mod session;
pub mod settings;
pub mod transport;
pub mod view;

// Re-export commonly used types for convenience
pub use clock::{ClockSource, DeviceClock, ManualClock, TickSink};
pub use command::{Command, CommandManager, SessionState, UndoableCommand};
pub use error::{CommandResult, TransportError};
pub use messaging::{create_midi_channel, MidiEventConsumer, MidiEventProducer};
pub use midi::{MidiAction, MidiEvent, MidiEventRouter, MidiInput, MidiMapping};
pub use section::{NewSection, Section, SectionId, SectionPatch, SectionRecord, SectionStore};
pub use session::{Session, SongInfo};
pub use settings::{SectionFile, Settings, SettingsError};
pub use transport::{LoopController, PlaybackPhase, SharedTransport, TransportState};
pub use view::{DragGesture, SliderGeometry, Snapshot};
