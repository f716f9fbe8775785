// DragGesture - Coalesces a slider drag into a single command
//
// Intermediate pointer moves only preview: a position drag seeks the
// transport live without touching the history, a marker drag just tracks
// the candidate bound. `finish` yields the one command that records the
// whole gesture.

use crate::command::{Command, PlayheadState, SessionState};
use crate::error::CommandResult;
use crate::section::{SectionId, SectionPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Position,
    SectionStart(SectionId),
    SectionEnd(SectionId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Origin {
    Playhead(PlayheadState),
    Bounds { start_frame: u64, end_frame: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    target: DragTarget,
    origin: Origin,
    /// Minimum frames kept between start and end markers
    min_gap: u64,
    song_length: u64,
    current: u64,
}

impl DragGesture {
    /// Begin dragging the playhead
    pub fn position(state: &SessionState) -> Self {
        let transport = state.transport_state();
        Self {
            target: DragTarget::Position,
            origin: Origin::Playhead(PlayheadState::capture(&transport)),
            min_gap: 1,
            song_length: transport.song_length,
            current: transport.position,
        }
    }

    /// Begin dragging a section's start marker
    pub fn section_start(state: &SessionState, id: SectionId, min_gap: u64) -> CommandResult<Self> {
        Self::marker(state, DragTarget::SectionStart(id), id, min_gap)
    }

    /// Begin dragging a section's end marker
    pub fn section_end(state: &SessionState, id: SectionId, min_gap: u64) -> CommandResult<Self> {
        Self::marker(state, DragTarget::SectionEnd(id), id, min_gap)
    }

    fn marker(
        state: &SessionState,
        target: DragTarget,
        id: SectionId,
        min_gap: u64,
    ) -> CommandResult<Self> {
        let section = state.sections.lookup(id)?;
        let current = match target {
            DragTarget::SectionEnd(_) => section.end_frame,
            _ => section.start_frame,
        };
        Ok(Self {
            target,
            origin: Origin::Bounds {
                start_frame: section.start_frame,
                end_frame: section.end_frame,
            },
            min_gap: min_gap.max(1),
            song_length: state.song_length(),
            current,
        })
    }

    pub fn target(&self) -> DragTarget {
        self.target
    }

    /// Frame the dragged item currently sits on
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Move the dragged item to `frame` and return where it landed
    pub fn update(&mut self, state: &SessionState, frame: u64) -> u64 {
        let frame = frame.min(self.song_length);
        self.current = match (self.target, self.origin) {
            (DragTarget::Position, _) => state.update_transport(|t| t.seek(frame)),
            (DragTarget::SectionStart(_), Origin::Bounds { end_frame, .. }) => {
                frame.min(end_frame.saturating_sub(self.min_gap))
            }
            (DragTarget::SectionEnd(_), Origin::Bounds { start_frame, .. }) => frame
                .max(start_frame.saturating_add(self.min_gap))
                .min(self.song_length),
            _ => frame,
        };
        self.current
    }

    /// Section bounds as the drag currently shows them
    pub fn preview_bounds(&self) -> Option<(u64, u64)> {
        match (self.target, self.origin) {
            (DragTarget::SectionStart(_), Origin::Bounds { end_frame, .. }) => {
                Some((self.current, end_frame))
            }
            (DragTarget::SectionEnd(_), Origin::Bounds { start_frame, .. }) => {
                Some((start_frame, self.current))
            }
            _ => None,
        }
    }

    /// End the gesture; `None` when a marker ended where it started
    pub fn finish(self) -> Option<Command> {
        match (self.target, self.origin) {
            (DragTarget::Position, Origin::Playhead(origin)) => {
                Some(Command::seek_from(self.current, origin))
            }
            (DragTarget::SectionStart(id), Origin::Bounds { start_frame, .. }) => {
                (self.current != start_frame).then(|| {
                    Command::update_section(
                        id,
                        SectionPatch {
                            start_frame: Some(self.current),
                            ..Default::default()
                        },
                    )
                })
            }
            (DragTarget::SectionEnd(id), Origin::Bounds { end_frame, .. }) => {
                (self.current != end_frame).then(|| {
                    Command::update_section(
                        id,
                        SectionPatch {
                            end_frame: Some(self.current),
                            ..Default::default()
                        },
                    )
                })
            }
            _ => None,
        }
    }

    /// Abandon the gesture, putting a dragged playhead back
    pub fn cancel(self, state: &SessionState) {
        if let Origin::Playhead(origin) = self.origin {
            state.update_transport(|t| origin.restore(t));
        }
    }
}
