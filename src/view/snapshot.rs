// Snapshot - Read-only picture of the session for one render frame

use crate::command::SessionState;
use crate::section::{Section, SectionId};
use crate::transport::{PlaybackPhase, TransportState};

/// Transport fields plus the section list, copied out together
///
/// The transport half is one value taken under the transport lock, so it is
/// never torn; it may be a tick or two stale by the time it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub position: u64,
    pub is_playing: bool,
    pub phase: PlaybackPhase,
    pub speed: f64,
    pub active_section_id: Option<SectionId>,
    pub count_in_remaining: Option<u64>,
    pub loop_enabled: bool,
    pub loop_delay_frames: u64,
    pub song_length: u64,
    /// Ordered by start frame
    pub sections: Vec<Section>,
}

impl Snapshot {
    pub fn capture(state: &SessionState) -> Self {
        Self::from_parts(
            &state.transport_state(),
            state.sections.list().into_iter().cloned().collect(),
        )
    }

    pub fn from_parts(transport: &TransportState, sections: Vec<Section>) -> Self {
        Self {
            position: transport.position,
            is_playing: transport.is_playing,
            phase: transport.phase(),
            speed: transport.speed,
            active_section_id: transport.active_section_id(),
            count_in_remaining: transport.count_in_remaining,
            loop_enabled: transport.loop_enabled,
            loop_delay_frames: transport.loop_delay_frames,
            song_length: transport.song_length,
            sections,
        }
    }

    pub fn active_section(&self) -> Option<&Section> {
        let id = self.active_section_id?;
        self.sections.iter().find(|section| section.id == id)
    }

    /// Playhead position as a fraction of the song, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.song_length == 0 {
            return 0.0;
        }
        self.position as f64 / self.song_length as f64
    }
}
