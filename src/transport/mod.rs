// Transport module - Authoritative playback state and the per-tick loop engine
//
// Data flow: ClockSource -> LoopController -> SharedTransport <- commands (UI)

pub mod loop_controller;
pub mod shared;
pub mod state;

pub use loop_controller::{LoopController, advance};
pub use shared::SharedTransport;
pub use state::{PlaybackPhase, TransportState, validate_speed};
