// Clock timing utilities - frame counting and device/song rate conversion

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared count of device frames delivered by a clock
#[derive(Clone, Debug)]
pub struct FrameCounter {
    /// Incremented by the audio callback
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameCounter {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Total frames delivered so far (called from the UI thread)
    pub fn current_frame(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Count delivered frames (called from the audio callback)
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }

    /// Elapsed time since the clock started
    pub fn elapsed_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.current_frame() as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Converts device frames into song frames without drift
///
/// Integer arithmetic with an exact remainder, so a 44.1 kHz song on a
/// 48 kHz device never gains or loses a frame over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateConverter {
    device_rate: u64,
    song_rate: u64,
    remainder: u64,
}

impl RateConverter {
    pub fn new(device_rate: u32, song_rate: u32) -> Self {
        Self {
            device_rate: u64::from(device_rate.max(1)),
            song_rate: u64::from(song_rate.max(1)),
            remainder: 0,
        }
    }

    /// Song frames corresponding to `device_frames` more device frames
    pub fn convert(&mut self, device_frames: u64) -> u64 {
        if self.device_rate == self.song_rate {
            return device_frames;
        }
        let total = device_frames
            .saturating_mul(self.song_rate)
            .saturating_add(self.remainder);
        self.remainder = total % self.device_rate;
        total / self.device_rate
    }

    pub fn is_identity(&self) -> bool {
        self.device_rate == self.song_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_creation() {
        let counter = FrameCounter::new(48_000);
        assert_eq!(counter.current_frame(), 0);
        assert_eq!(counter.sample_rate(), 48_000);
    }

    #[test]
    fn test_counter_advance() {
        let counter = FrameCounter::new(48_000);
        counter.advance(480);
        counter.advance(480);
        assert_eq!(counter.current_frame(), 960);
        assert!((counter.elapsed_seconds() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_counter_shared_between_clones() {
        let counter = FrameCounter::new(44_100);
        let audio_side = counter.clone();
        audio_side.advance(100);
        assert_eq!(counter.current_frame(), 100);
    }

    #[test]
    fn test_identity_conversion() {
        let mut converter = RateConverter::new(48_000, 48_000);
        assert!(converter.is_identity());
        assert_eq!(converter.convert(512), 512);
    }

    #[test]
    fn test_conversion_has_no_drift() {
        let mut converter = RateConverter::new(48_000, 44_100);
        let mut song_frames = 0;
        // One second of 512-frame device buffers (48_000 = 93 * 512 + 384)
        for _ in 0..93 {
            song_frames += converter.convert(512);
        }
        song_frames += converter.convert(384);
        assert_eq!(song_frames, 44_100);
    }
}
