// Clock module - Real-time tick delivery
//
// A ClockSource turns the audio device's callback into `on_tick(frames)`
// calls on a TickSink (the LoopController). Deltas are always expressed in
// song frames, whatever the device buffer size or sample rate.

pub mod device;
pub mod manual;
pub mod timing;

pub use device::DeviceClock;
pub use manual::ManualClock;
pub use timing::{FrameCounter, RateConverter};

use crate::error::{CommandResult, TransportError};

/// Receiver of clock ticks
///
/// Called from the real-time audio callback: implementations must not block
/// or allocate.
pub trait TickSink: Send + Sync + 'static {
    fn on_tick(&self, frame_delta: u64);
}

/// Source of monotonically increasing frame counts
pub trait ClockSource {
    /// Start delivering ticks to `sink`
    fn start(&mut self, sink: Box<dyn TickSink>) -> Result<(), ClockError>;

    /// Stop delivering ticks; the sink is dropped
    fn stop(&mut self);

    /// Rate (frames per second) of the deltas handed to the sink
    fn sample_rate(&self) -> u32;

    fn is_running(&self) -> bool;
}

/// Errors raised while starting a clock
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Audio configuration error: {0}")]
    Config(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Clock already running")]
    AlreadyRunning,
}

/// Validate a signed frame delta coming from an external clock
pub fn checked_delta(frames: i64) -> CommandResult<u64> {
    u64::try_from(frames).map_err(|_| {
        TransportError::InvalidParameter(format!("frame delta must be >= 0, got {}", frames))
    })
}
