// DeviceClock - ClockSource driven by the default CPAL output device
//
// The stream renders silence (mixing lives elsewhere); its only job here is
// to turn each device callback into a tick measured in song frames.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::clock::timing::{FrameCounter, RateConverter};
use crate::clock::{ClockError, ClockSource, TickSink};

/// Device connection status, shared with the stream's error callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Stopped = 0,
    Connecting = 1,
    Running = 2,
    Error = 3,
}

impl From<u8> for DeviceStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => DeviceStatus::Connecting,
            2 => DeviceStatus::Running,
            3 => DeviceStatus::Error,
            _ => DeviceStatus::Stopped,
        }
    }
}

/// Atomic wrapper to share the status between threads
#[derive(Clone, Debug)]
pub struct AtomicDeviceStatus {
    inner: Arc<AtomicU8>,
}

impl AtomicDeviceStatus {
    pub fn new(status: DeviceStatus) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(status as u8)),
        }
    }

    pub fn get(&self) -> DeviceStatus {
        DeviceStatus::from(self.inner.load(Ordering::Relaxed))
    }

    pub fn set(&self, status: DeviceStatus) {
        self.inner.store(status as u8, Ordering::Relaxed);
    }
}

/// Clock backed by the audio output callback
pub struct DeviceClock {
    song_sample_rate: u32,
    stream: Option<Stream>,
    counter: Option<FrameCounter>,
    status: AtomicDeviceStatus,
}

impl DeviceClock {
    /// `song_sample_rate` is the rate tick deltas are expressed in
    pub fn new(song_sample_rate: u32) -> Self {
        Self {
            song_sample_rate,
            stream: None,
            counter: None,
            status: AtomicDeviceStatus::new(DeviceStatus::Stopped),
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }

    /// Device frames delivered since `start` (None when stopped)
    pub fn device_frames(&self) -> Option<u64> {
        self.counter.as_ref().map(FrameCounter::current_frame)
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        sink: Box<dyn TickSink>,
        mut converter: RateConverter,
        counter: FrameCounter,
        status: AtomicDeviceStatus,
    ) -> Result<Stream, ClockError>
    where
        T: SizedSample + Send + 'static,
    {
        let channels = channels.max(1);
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // ========== SACRED ZONE ==========
                    // No allocations, No I/O, No blocking locks
                    for sample in data.iter_mut() {
                        *sample = T::EQUILIBRIUM;
                    }
                    let frames = (data.len() / channels) as u64;
                    counter.advance(frames);
                    sink.on_tick(converter.convert(frames));
                },
                move |err| {
                    // Runs outside the audio callback
                    tracing::warn!("audio stream error: {}", err);
                    status.set(DeviceStatus::Error);
                },
                None,
            )
            .map_err(|e| ClockError::Stream(e.to_string()))
    }
}

impl ClockSource for DeviceClock {
    fn start(&mut self, sink: Box<dyn TickSink>) -> Result<(), ClockError> {
        if self.stream.is_some() {
            return Err(ClockError::AlreadyRunning);
        }
        self.status.set(DeviceStatus::Connecting);

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            self.status.set(DeviceStatus::Error);
            ClockError::NoDevice
        })?;
        tracing::info!(
            "audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported = device
            .default_output_config()
            .map_err(|e| ClockError::Config(e.to_string()))?;
        let sample_format = supported.sample_format();
        let device_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: StreamConfig = supported.into();
        tracing::debug!(
            "audio config: {} Hz, {} channels, {:?}",
            device_rate,
            channels,
            sample_format
        );

        let converter = RateConverter::new(device_rate, self.song_sample_rate);
        let counter = FrameCounter::new(device_rate);
        let status = self.status.clone();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                sink,
                converter,
                counter.clone(),
                status,
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                sink,
                converter,
                counter.clone(),
                status,
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                sink,
                converter,
                counter.clone(),
                status,
            ),
            other => Err(ClockError::UnsupportedFormat(format!("{:?}", other))),
        }
        .inspect_err(|_| self.status.set(DeviceStatus::Error))?;

        stream
            .play()
            .map_err(|e| ClockError::Stream(e.to_string()))?;

        self.stream = Some(stream);
        self.counter = Some(counter);
        self.status.set(DeviceStatus::Running);
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the stream stops the callback and drops the sink
        self.stream = None;
        self.counter = None;
        self.status.set(DeviceStatus::Stopped);
    }

    fn sample_rate(&self) -> u32 {
        self.song_sample_rate
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        let status = AtomicDeviceStatus::new(DeviceStatus::Stopped);
        assert_eq!(status.get(), DeviceStatus::Stopped);

        status.set(DeviceStatus::Running);
        assert_eq!(status.get(), DeviceStatus::Running);

        assert_eq!(DeviceStatus::from(42), DeviceStatus::Stopped);
    }

    #[test]
    fn test_new_clock_is_stopped() {
        let clock = DeviceClock::new(44_100);
        assert!(!clock.is_running());
        assert_eq!(clock.sample_rate(), 44_100);
        assert_eq!(clock.status(), DeviceStatus::Stopped);
        assert_eq!(clock.device_frames(), None);
    }
}
