// TransportState - Play position, flags, speed and count-in
//
// Plain data (Copy) so the audio thread can update it in place and the UI
// can take whole-value snapshots. Every transition is a total function over
// these fields; invalid inputs are rejected before anything is written.

use crate::error::{CommandResult, TransportError};
use crate::section::{LoopRegion, SectionId};

/// Playback phase derived from the transport fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Stopped,
    /// Playing, but the count-in has not reached zero yet (no audio)
    CountingIn,
    Playing,
}

impl PlaybackPhase {
    /// Check if the transport is running (counting in or playing)
    pub fn is_running(&self) -> bool {
        !matches!(self, PlaybackPhase::Stopped)
    }

    /// Check if audio is audible in this phase
    pub fn is_audible(&self) -> bool {
        matches!(self, PlaybackPhase::Playing)
    }
}

/// Authoritative transport state of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    /// Frames since song start, `0 <= position <= song_length`
    pub position: u64,
    pub is_playing: bool,
    /// Frame-advance rate per clock frame, always > 0
    pub speed: f64,
    /// Bounds of the active section, mirrored from the section store
    pub active: Option<LoopRegion>,
    /// Frames left before audio starts (count-in or loop delay)
    pub count_in_remaining: Option<u64>,
    pub loop_enabled: bool,
    /// Pause inserted on every loop wrap
    pub loop_delay_frames: u64,
    pub song_length: u64,
    /// Fractional frame remainder carried between ticks
    pub(crate) frame_carry: f64,
}

impl TransportState {
    /// Stopped transport at the song start
    pub fn new(song_length: u64) -> Self {
        Self {
            position: 0,
            is_playing: false,
            speed: 1.0,
            active: None,
            count_in_remaining: None,
            loop_enabled: true,
            loop_delay_frames: 0,
            song_length,
            frame_carry: 0.0,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (self.is_playing, self.count_in_remaining) {
            (false, _) => PlaybackPhase::Stopped,
            (true, Some(remaining)) if remaining > 0 => PlaybackPhase::CountingIn,
            (true, _) => PlaybackPhase::Playing,
        }
    }

    pub fn active_section_id(&self) -> Option<SectionId> {
        self.active.map(|region| region.id)
    }

    /// Move the playhead, clamping to the song
    ///
    /// While playing, leaving the active section's bounds deactivates it. A
    /// pending countdown is dropped unless the target is the section start.
    pub fn seek(&mut self, target: u64) -> u64 {
        let position = target.min(self.song_length);
        self.position = position;
        self.frame_carry = 0.0;

        if let Some(region) = self.active {
            if self.is_playing && !region.contains(position) {
                self.active = None;
            }
        }
        let at_section_start = self
            .active
            .is_some_and(|region| region.start_frame == position);
        if !at_section_start {
            self.count_in_remaining = None;
        }
        position
    }

    /// Start or stop playback
    ///
    /// Starting exactly on the active section's start arms its count-in when
    /// no countdown is pending.
    pub fn set_playing(&mut self, playing: bool) {
        if playing && !self.is_playing && self.count_in_remaining.is_none() {
            if let Some(region) = self.active {
                if region.count_in_frames > 0 && self.position == region.start_frame {
                    self.count_in_remaining = Some(region.count_in_frames);
                }
            }
        }
        self.is_playing = playing;
    }

    /// Change the playback rate (position is unaffected)
    pub fn set_speed(&mut self, multiplier: f64) -> CommandResult<()> {
        validate_speed(multiplier)?;
        self.speed = multiplier;
        Ok(())
    }

    /// Activate a section (or none) and jump to its start
    pub fn set_active_section(&mut self, region: Option<LoopRegion>) {
        self.active = region;
        self.frame_carry = 0.0;
        match region {
            Some(region) => {
                self.position = region.start_frame.min(self.song_length);
                self.count_in_remaining =
                    (region.count_in_frames > 0).then_some(region.count_in_frames);
            }
            None => self.count_in_remaining = None,
        }
    }

    /// Replace the mirrored bounds after the active section was edited
    pub fn refresh_active(&mut self, region: LoopRegion) {
        if self.active_section_id() == Some(region.id) {
            self.active = Some(region);
        }
    }

    /// Drop the active section if it is `id`; returns true if it was active
    pub fn clear_active_if(&mut self, id: SectionId) -> bool {
        if self.active_section_id() == Some(id) {
            self.active = None;
            self.count_in_remaining = None;
            true
        } else {
            false
        }
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn set_loop_delay(&mut self, frames: u64) {
        self.loop_delay_frames = frames;
    }
}

/// Speed must be a finite, strictly positive multiplier
pub fn validate_speed(multiplier: f64) -> CommandResult<()> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(TransportError::InvalidParameter(format!(
            "speed multiplier must be > 0, got {}",
            multiplier
        )));
    }
    Ok(())
}
