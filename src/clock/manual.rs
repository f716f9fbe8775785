// ManualClock - Clock driven by explicit calls (offline rendering, tests)

use crate::clock::timing::FrameCounter;
use crate::clock::{ClockError, ClockSource, TickSink, checked_delta};
use crate::error::CommandResult;

/// Delivers ticks only when asked to
pub struct ManualClock {
    sink: Option<Box<dyn TickSink>>,
    counter: FrameCounter,
}

impl ManualClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sink: None,
            counter: FrameCounter::new(sample_rate),
        }
    }

    /// Deliver one tick of `frames` frames
    ///
    /// Negative deltas are rejected; ticks before `start` are only counted.
    pub fn advance(&mut self, frames: i64) -> CommandResult<()> {
        let delta = checked_delta(frames)?;
        self.counter.advance(delta);
        if let Some(sink) = &self.sink {
            sink.on_tick(delta);
        }
        Ok(())
    }

    /// Deliver `total` frames split into device-sized blocks
    pub fn run(&mut self, total: u64, block: u64) {
        let block = block.max(1);
        let mut left = total;
        while left > 0 {
            let delta = left.min(block);
            self.counter.advance(delta);
            if let Some(sink) = &self.sink {
                sink.on_tick(delta);
            }
            left -= delta;
        }
    }

    pub fn counter(&self) -> &FrameCounter {
        &self.counter
    }
}

impl ClockSource for ManualClock {
    fn start(&mut self, sink: Box<dyn TickSink>) -> Result<(), ClockError> {
        if self.sink.is_some() {
            return Err(ClockError::AlreadyRunning);
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.sink = None;
    }

    fn sample_rate(&self) -> u32 {
        self.counter.sample_rate()
    }

    fn is_running(&self) -> bool {
        self.sink.is_some()
    }
}
