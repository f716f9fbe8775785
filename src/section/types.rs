// Section types - Named loop regions over the song timeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a section
///
/// Allocated from a monotonic counter and never reused within a song, so a
/// stale id fails with `NotFound` instead of resolving to another section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub u64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named loop region, in sample frames
///
/// Invariant: `0 <= start_frame < end_frame <= song_length`.
/// Also the record format handed to the settings collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub start_frame: u64,
    pub end_frame: u64,
    pub loop_enabled: bool,
    /// Countdown played before the section starts (0 = none)
    #[serde(default)]
    pub count_in_frames: u64,
}

impl Section {
    /// Length of one loop period in frames
    pub fn len_frames(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    /// Check if a frame lies inside `[start_frame, end_frame]`
    ///
    /// The end is inclusive: a playhead parked exactly on the end marker
    /// still belongs to the section.
    pub fn contains(&self, frame: u64) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame)
    }

    /// Copy of the bounds the audio thread needs
    pub fn loop_region(&self) -> LoopRegion {
        LoopRegion {
            id: self.id,
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            loop_enabled: self.loop_enabled,
            count_in_frames: self.count_in_frames,
        }
    }
}

/// Record exchanged with the settings collaborator
pub type SectionRecord = Section;

/// Plain-data copy of the active section's bounds
///
/// Lives inside the transport state so the per-tick loop decision never has
/// to look into the section store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRegion {
    pub id: SectionId,
    pub start_frame: u64,
    pub end_frame: u64,
    /// The section's own loop flag; wrapping also needs the transport's
    pub loop_enabled: bool,
    pub count_in_frames: u64,
}

impl LoopRegion {
    pub fn len_frames(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    pub fn contains(&self, frame: u64) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame)
    }
}

/// Parameters for a section that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    pub name: String,
    pub start_frame: u64,
    pub end_frame: u64,
    pub loop_enabled: bool,
    pub count_in_frames: u64,
}

impl NewSection {
    /// Looping section without count-in
    pub fn new(name: impl Into<String>, start_frame: u64, end_frame: u64) -> Self {
        Self {
            name: name.into(),
            start_frame,
            end_frame,
            loop_enabled: true,
            count_in_frames: 0,
        }
    }

    pub fn with_loop(mut self, loop_enabled: bool) -> Self {
        self.loop_enabled = loop_enabled;
        self
    }

    pub fn with_count_in(mut self, count_in_frames: u64) -> Self {
        self.count_in_frames = count_in_frames;
        self
    }
}

/// Partial update of a section; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPatch {
    pub name: Option<String>,
    pub start_frame: Option<u64>,
    pub end_frame: Option<u64>,
    pub loop_enabled: Option<bool>,
    pub count_in_frames: Option<u64>,
}

impl SectionPatch {
    pub fn bounds(start_frame: u64, end_frame: u64) -> Self {
        Self {
            start_frame: Some(start_frame),
            end_frame: Some(end_frame),
            ..Default::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Section that results from applying this patch (not validated)
    pub fn applied_to(&self, section: &Section) -> Section {
        Section {
            id: section.id,
            name: self.name.clone().unwrap_or_else(|| section.name.clone()),
            start_frame: self.start_frame.unwrap_or(section.start_frame),
            end_frame: self.end_frame.unwrap_or(section.end_frame),
            loop_enabled: self.loop_enabled.unwrap_or(section.loop_enabled),
            count_in_frames: self.count_in_frames.unwrap_or(section.count_in_frames),
        }
    }
}

impl From<&Section> for SectionPatch {
    /// Patch that sets every field to the section's current value
    fn from(section: &Section) -> Self {
        Self {
            name: Some(section.name.clone()),
            start_frame: Some(section.start_frame),
            end_frame: Some(section.end_frame),
            loop_enabled: Some(section.loop_enabled),
            count_in_frames: Some(section.count_in_frames),
        }
    }
}
