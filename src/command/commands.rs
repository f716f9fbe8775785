// Concrete command implementations
//
// One variant per mutation. The `undo` payload of each variant is filled by
// `execute` and read back by `undo`; callers build commands through the
// constructor functions and leave it empty.

use crate::command::state::SessionState;
use crate::command::trait_def::UndoableCommand;
use crate::error::{CommandResult, TransportError};
use crate::section::{LoopRegion, NewSection, Section, SectionId, SectionPatch};
use crate::transport::{TransportState, validate_speed};

/// Speed multipliers reachable through nudges
pub const SPEED_RANGE: (f64, f64) = (0.25, 2.0);

/// Default nudge step
pub const SPEED_STEP: f64 = 0.05;

/// Playhead fields touched by seeks and section selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayheadState {
    pub position: u64,
    pub active: Option<LoopRegion>,
    pub count_in_remaining: Option<u64>,
    frame_carry: f64,
}

impl PlayheadState {
    pub fn capture(state: &TransportState) -> Self {
        Self {
            position: state.position,
            active: state.active,
            count_in_remaining: state.count_in_remaining,
            frame_carry: state.frame_carry,
        }
    }

    pub fn restore(&self, state: &mut TransportState) {
        state.position = self.position.min(state.song_length);
        state.active = self.active;
        state.count_in_remaining = self.count_in_remaining;
        state.frame_carry = self.frame_carry;
    }
}

/// Active-section fields touched by section deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveState {
    pub active: Option<LoopRegion>,
    pub count_in_remaining: Option<u64>,
}

impl ActiveState {
    pub fn capture(state: &TransportState) -> Self {
        Self {
            active: state.active,
            count_in_remaining: state.count_in_remaining,
        }
    }

    pub fn restore(&self, state: &mut TransportState) {
        state.active = self.active;
        state.count_in_remaining = self.count_in_remaining;
    }
}

/// Fields touched by play/stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOrigin {
    pub is_playing: bool,
    pub count_in_remaining: Option<u64>,
}

impl PlayOrigin {
    pub fn capture(state: &TransportState) -> Self {
        Self {
            is_playing: state.is_playing,
            count_in_remaining: state.count_in_remaining,
        }
    }

    pub fn restore(&self, state: &mut TransportState) {
        state.is_playing = self.is_playing;
        state.count_in_remaining = self.count_in_remaining;
    }
}

/// Every undoable mutation of a session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move the playhead (clamped to the song)
    ///
    /// `origin` may be pre-filled by a drag gesture with the state from
    /// before the drag; `execute` only captures it when empty.
    Seek {
        target: u64,
        origin: Option<PlayheadState>,
    },
    SetPlaying {
        playing: bool,
        undo: Option<PlayOrigin>,
    },
    TogglePlayback {
        undo: Option<PlayOrigin>,
    },
    SetSpeed {
        speed: f64,
        undo: Option<f64>,
    },
    /// Relative speed change, clamped to `SPEED_RANGE`
    NudgeSpeed {
        step: f64,
        undo: Option<f64>,
    },
    SetLoopEnabled {
        enabled: bool,
        undo: Option<bool>,
    },
    ToggleLoop {
        undo: Option<bool>,
    },
    SetLoopDelay {
        frames: u64,
        undo: Option<u64>,
    },
    SetActiveSection {
        target: Option<SectionId>,
        undo: Option<PlayheadState>,
    },
    /// Activate the section after the active one (list order, wrapping)
    NextSection {
        resolved: Option<SectionId>,
        undo: Option<PlayheadState>,
    },
    /// Activate the section before the active one (list order, wrapping)
    PreviousSection {
        resolved: Option<SectionId>,
        undo: Option<PlayheadState>,
    },
    /// Jump back to the active section's start (song start without one)
    RewindToSectionStart {
        undo: Option<PlayheadState>,
    },
    CreateSection {
        new: NewSection,
        /// The created section, reinserted as-is on redo
        created: Option<Section>,
    },
    UpdateSection {
        id: SectionId,
        patch: SectionPatch,
        undo: Option<Section>,
    },
    /// Delete a section; clears it from the transport if it was active
    DeleteSection {
        id: SectionId,
        undo: Option<(Section, ActiveState)>,
    },
}

impl Command {
    pub fn seek(target: u64) -> Self {
        Command::Seek {
            target,
            origin: None,
        }
    }

    /// Seek whose undo returns to `origin` (end of a drag gesture)
    pub fn seek_from(target: u64, origin: PlayheadState) -> Self {
        Command::Seek {
            target,
            origin: Some(origin),
        }
    }

    pub fn set_playing(playing: bool) -> Self {
        Command::SetPlaying {
            playing,
            undo: None,
        }
    }

    pub fn toggle_playback() -> Self {
        Command::TogglePlayback { undo: None }
    }

    pub fn set_speed(speed: f64) -> Self {
        Command::SetSpeed { speed, undo: None }
    }

    pub fn nudge_speed(step: f64) -> Self {
        Command::NudgeSpeed { step, undo: None }
    }

    pub fn set_loop_enabled(enabled: bool) -> Self {
        Command::SetLoopEnabled {
            enabled,
            undo: None,
        }
    }

    pub fn toggle_loop() -> Self {
        Command::ToggleLoop { undo: None }
    }

    pub fn set_loop_delay(frames: u64) -> Self {
        Command::SetLoopDelay { frames, undo: None }
    }

    pub fn set_active_section(target: Option<SectionId>) -> Self {
        Command::SetActiveSection { target, undo: None }
    }

    pub fn next_section() -> Self {
        Command::NextSection {
            resolved: None,
            undo: None,
        }
    }

    pub fn previous_section() -> Self {
        Command::PreviousSection {
            resolved: None,
            undo: None,
        }
    }

    pub fn rewind() -> Self {
        Command::RewindToSectionStart { undo: None }
    }

    pub fn create_section(new: NewSection) -> Self {
        Command::CreateSection { new, created: None }
    }

    pub fn update_section(id: SectionId, patch: SectionPatch) -> Self {
        Command::UpdateSection {
            id,
            patch,
            undo: None,
        }
    }

    pub fn delete_section(id: SectionId) -> Self {
        Command::DeleteSection { id, undo: None }
    }

    /// Id of the section created by the last execute of a CreateSection
    pub fn created_section_id(&self) -> Option<SectionId> {
        match self {
            Command::CreateSection {
                created: Some(section),
                ..
            } => Some(section.id),
            _ => None,
        }
    }
}

/// Resolve a section id into the bounds the audio thread reads
fn region_of(state: &SessionState, id: SectionId) -> CommandResult<LoopRegion> {
    state.sections.lookup(id).map(Section::loop_region)
}

/// Activate `region` (or none) and return the playhead as it was
fn select(state: &SessionState, region: Option<LoopRegion>) -> PlayheadState {
    state.update_transport(|t| {
        let before = PlayheadState::capture(t);
        t.set_active_section(region);
        before
    })
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

/// Activate the neighbour of the active section, resolving it on first run
fn select_neighbour(
    state: &SessionState,
    resolved: &mut Option<SectionId>,
    direction: Direction,
) -> CommandResult<PlayheadState> {
    let id = match *resolved {
        Some(id) => id,
        None => {
            let current = state.transport_state().active_section_id();
            let found = match direction {
                Direction::Next => state.sections.next_after(current),
                Direction::Previous => state.sections.previous_before(current),
            };
            found.ok_or_else(|| TransportError::InvalidParameter("no sections defined".into()))?
        }
    };
    let region = region_of(state, id)?;
    *resolved = Some(id);
    Ok(select(state, Some(region)))
}

fn restore_playhead(state: &SessionState, undo: &Option<PlayheadState>) -> CommandResult<()> {
    let playhead = undo.ok_or_else(not_executed)?;
    state.update_transport(|t| playhead.restore(t));
    Ok(())
}

fn not_executed() -> TransportError {
    TransportError::InvalidParameter("command has not been executed".into())
}

fn clamp_speed(speed: f64) -> f64 {
    let rounded = (speed * 100.0).round() / 100.0;
    rounded.clamp(SPEED_RANGE.0, SPEED_RANGE.1)
}

impl UndoableCommand for Command {
    fn execute(&mut self, state: &mut SessionState) -> CommandResult<()> {
        match self {
            Command::Seek { target, origin } => {
                let target = *target;
                let before = state.update_transport(|t| {
                    let before = PlayheadState::capture(t);
                    t.seek(target);
                    before
                });
                origin.get_or_insert(before);
            }
            Command::SetPlaying { playing, undo } => {
                let playing = *playing;
                *undo = Some(state.update_transport(|t| {
                    let before = PlayOrigin::capture(t);
                    t.set_playing(playing);
                    before
                }));
            }
            Command::TogglePlayback { undo } => {
                *undo = Some(state.update_transport(|t| {
                    let before = PlayOrigin::capture(t);
                    t.set_playing(!t.is_playing);
                    before
                }));
            }
            Command::SetSpeed { speed, undo } => {
                let speed = *speed;
                validate_speed(speed)?;
                *undo = Some(state.update_transport(|t| {
                    let before = t.speed;
                    t.speed = speed;
                    before
                }));
            }
            Command::NudgeSpeed { step, undo } => {
                let step = *step;
                if !step.is_finite() {
                    return Err(TransportError::InvalidParameter(format!(
                        "speed step must be finite, got {}",
                        step
                    )));
                }
                *undo = Some(state.update_transport(|t| {
                    let before = t.speed;
                    t.speed = clamp_speed(before + step);
                    before
                }));
            }
            Command::SetLoopEnabled { enabled, undo } => {
                let enabled = *enabled;
                *undo = Some(state.update_transport(|t| {
                    let before = t.loop_enabled;
                    t.set_loop_enabled(enabled);
                    before
                }));
            }
            Command::ToggleLoop { undo } => {
                *undo = Some(state.update_transport(|t| {
                    let before = t.loop_enabled;
                    t.set_loop_enabled(!before);
                    before
                }));
            }
            Command::SetLoopDelay { frames, undo } => {
                let frames = *frames;
                *undo = Some(state.update_transport(|t| {
                    let before = t.loop_delay_frames;
                    t.set_loop_delay(frames);
                    before
                }));
            }
            Command::SetActiveSection { target, undo } => {
                let region = match *target {
                    Some(id) => Some(region_of(state, id)?),
                    None => None,
                };
                *undo = Some(select(state, region));
            }
            Command::NextSection { resolved, undo } => {
                *undo = Some(select_neighbour(state, resolved, Direction::Next)?);
            }
            Command::PreviousSection { resolved, undo } => {
                *undo = Some(select_neighbour(state, resolved, Direction::Previous)?);
            }
            Command::RewindToSectionStart { undo } => {
                *undo = Some(state.update_transport(|t| {
                    let before = PlayheadState::capture(t);
                    match t.active {
                        Some(region) => t.set_active_section(Some(region)),
                        None => {
                            t.seek(0);
                        }
                    }
                    before
                }));
            }
            Command::CreateSection { new, created } => {
                let section = match created {
                    Some(section) => {
                        state.sections.restore(section.clone())?;
                        section.clone()
                    }
                    None => {
                        let id = state.sections.create_section(new.clone())?;
                        state.sections.lookup(id)?.clone()
                    }
                };
                *created = Some(section);
            }
            Command::UpdateSection { id, patch, undo } => {
                let id = *id;
                let previous = state.sections.update(id, patch)?;
                let region = region_of(state, id)?;
                state.update_transport(|t| t.refresh_active(region));
                *undo = Some(previous);
            }
            Command::DeleteSection { id, undo } => {
                let id = *id;
                state.sections.lookup(id)?;
                // Stop the audio thread looping on it before it disappears
                let active = state.update_transport(|t| {
                    let before = ActiveState::capture(t);
                    t.clear_active_if(id);
                    before
                });
                let removed = state.sections.delete(id)?;
                *undo = Some((removed, active));
            }
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut SessionState) -> CommandResult<()> {
        match self {
            Command::Seek { origin, .. } => restore_playhead(state, origin)?,
            Command::SetPlaying { undo, .. } | Command::TogglePlayback { undo } => {
                let before = undo.ok_or_else(not_executed)?;
                state.update_transport(|t| before.restore(t));
            }
            Command::SetSpeed { undo, .. } | Command::NudgeSpeed { undo, .. } => {
                let before = undo.ok_or_else(not_executed)?;
                state.update_transport(|t| t.speed = before);
            }
            Command::SetLoopEnabled { undo, .. } | Command::ToggleLoop { undo } => {
                let before = undo.ok_or_else(not_executed)?;
                state.update_transport(|t| t.set_loop_enabled(before));
            }
            Command::SetLoopDelay { undo, .. } => {
                let before = undo.ok_or_else(not_executed)?;
                state.update_transport(|t| t.set_loop_delay(before));
            }
            Command::SetActiveSection { undo, .. }
            | Command::NextSection { undo, .. }
            | Command::PreviousSection { undo, .. }
            | Command::RewindToSectionStart { undo } => restore_playhead(state, undo)?,
            Command::CreateSection { created, .. } => {
                let section = created.as_ref().ok_or_else(not_executed)?;
                let id = section.id;
                state.update_transport(|t| t.clear_active_if(id));
                state.sections.delete(id)?;
            }
            Command::UpdateSection { id, undo, .. } => {
                let previous = undo.as_ref().ok_or_else(not_executed)?;
                state.sections.update(*id, &SectionPatch::from(previous))?;
                let region = previous.loop_region();
                state.update_transport(|t| t.refresh_active(region));
            }
            Command::DeleteSection { undo, .. } => {
                let (section, active) = undo.as_ref().ok_or_else(not_executed)?;
                state.sections.restore(section.clone())?;
                let active = *active;
                state.update_transport(|t| active.restore(t));
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        match self {
            Command::Seek { target, .. } => format!("Seek to frame {}", target),
            Command::SetPlaying { playing: true, .. } => "Play".to_string(),
            Command::SetPlaying { playing: false, .. } => "Stop".to_string(),
            Command::TogglePlayback { .. } => "Toggle Play/Stop".to_string(),
            Command::SetSpeed { speed, .. } => format!("Set Speed to {:.2}x", speed),
            Command::NudgeSpeed { step, .. } => format!("Nudge Speed by {:+.2}", step),
            Command::SetLoopEnabled { enabled, .. } => {
                format!("Loop {}", if *enabled { "On" } else { "Off" })
            }
            Command::ToggleLoop { .. } => "Toggle Loop".to_string(),
            Command::SetLoopDelay { frames, .. } => format!("Set Loop Delay to {} frames", frames),
            Command::SetActiveSection {
                target: Some(id), ..
            } => format!("Select Section {}", id),
            Command::SetActiveSection { target: None, .. } => "Select Full Song".to_string(),
            Command::NextSection { .. } => "Next Section".to_string(),
            Command::PreviousSection { .. } => "Previous Section".to_string(),
            Command::RewindToSectionStart { .. } => "Rewind to Section Start".to_string(),
            Command::CreateSection { new, .. } => format!("Create Section '{}'", new.name.trim()),
            Command::UpdateSection { id, .. } => format!("Edit Section {}", id),
            Command::DeleteSection { id, .. } => format!("Delete Section {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{NewSection, SectionPatch};

    fn state_with_sections() -> (SessionState, SectionId, SectionId) {
        let mut state = SessionState::new(1000);
        let verse = state
            .sections
            .create_section(NewSection::new("Verse", 100, 300))
            .unwrap();
        let chorus = state
            .sections
            .create_section(NewSection::new("Chorus", 400, 700).with_count_in(50))
            .unwrap();
        (state, verse, chorus)
    }

    fn run(command: &mut Command, state: &mut SessionState) {
        command.execute(state).unwrap();
    }

    #[test]
    fn test_seek_undo_restores_position() {
        let mut state = SessionState::new(1000);
        let mut command = Command::seek(250);

        run(&mut command, &mut state);
        assert_eq!(state.transport_state().position, 250);

        command.undo(&mut state).unwrap();
        assert_eq!(state.transport_state().position, 0);
    }

    #[test]
    fn test_seek_from_keeps_drag_origin() {
        let mut state = SessionState::new(1000);
        let origin = PlayheadState::capture(&state.transport_state());

        // Live updates during a drag happen outside the history
        state.update_transport(|t| {
            t.seek(600);
        });

        let mut command = Command::seek_from(700, origin);
        run(&mut command, &mut state);
        assert_eq!(state.transport_state().position, 700);

        command.undo(&mut state).unwrap();
        assert_eq!(state.transport_state().position, 0);
    }

    #[test]
    fn test_toggle_playback_and_undo() {
        let mut state = SessionState::new(1000);
        let mut command = Command::toggle_playback();

        run(&mut command, &mut state);
        assert!(state.transport_state().is_playing);

        command.undo(&mut state).unwrap();
        assert!(!state.transport_state().is_playing);
    }

    #[test]
    fn test_set_speed_rejects_invalid_values() {
        let mut state = SessionState::new(1000);

        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut command = Command::set_speed(speed);
            assert!(matches!(
                command.execute(&mut state),
                Err(TransportError::InvalidParameter(_))
            ));
        }
        assert_eq!(state.transport_state().speed, 1.0);
    }

    #[test]
    fn test_nudge_speed_clamps_to_range() {
        let mut state = SessionState::new(1000);
        state.update_transport(|t| t.speed = 1.98);

        let mut command = Command::nudge_speed(SPEED_STEP);
        run(&mut command, &mut state);
        assert_eq!(state.transport_state().speed, SPEED_RANGE.1);

        command.undo(&mut state).unwrap();
        assert_eq!(state.transport_state().speed, 1.98);

        state.update_transport(|t| t.speed = 0.25);
        let mut command = Command::nudge_speed(-SPEED_STEP);
        run(&mut command, &mut state);
        assert_eq!(state.transport_state().speed, SPEED_RANGE.0);
    }

    #[test]
    fn test_nudge_speed_avoids_float_noise() {
        let mut state = SessionState::new(1000);
        for _ in 0..3 {
            run(&mut Command::nudge_speed(SPEED_STEP), &mut state);
        }
        assert_eq!(state.transport_state().speed, 1.15);
    }

    #[test]
    fn test_select_section_moves_to_start_and_arms_count_in() {
        let (mut state, _, chorus) = state_with_sections();
        let mut command = Command::set_active_section(Some(chorus));

        run(&mut command, &mut state);
        let transport = state.transport_state();
        assert_eq!(transport.position, 400);
        assert_eq!(transport.active_section_id(), Some(chorus));
        assert_eq!(transport.count_in_remaining, Some(50));

        command.undo(&mut state).unwrap();
        let transport = state.transport_state();
        assert_eq!(transport.position, 0);
        assert_eq!(transport.active_section_id(), None);
        assert_eq!(transport.count_in_remaining, None);
    }

    #[test]
    fn test_select_missing_section_fails() {
        let (mut state, _, _) = state_with_sections();
        let mut command = Command::set_active_section(Some(SectionId(99)));
        assert_eq!(
            command.execute(&mut state),
            Err(TransportError::NotFound(SectionId(99)))
        );
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let (mut state, verse, chorus) = state_with_sections();

        run(&mut Command::next_section(), &mut state);
        assert_eq!(state.transport_state().active_section_id(), Some(verse));

        run(&mut Command::next_section(), &mut state);
        assert_eq!(state.transport_state().active_section_id(), Some(chorus));

        run(&mut Command::next_section(), &mut state);
        assert_eq!(state.transport_state().active_section_id(), Some(verse));

        run(&mut Command::previous_section(), &mut state);
        assert_eq!(state.transport_state().active_section_id(), Some(chorus));
    }

    #[test]
    fn test_next_section_redo_targets_same_section() {
        let (mut state, verse, _) = state_with_sections();
        let mut command = Command::next_section();

        run(&mut command, &mut state);
        command.undo(&mut state).unwrap();
        run(&mut command, &mut state);

        assert_eq!(state.transport_state().active_section_id(), Some(verse));
    }

    #[test]
    fn test_next_section_without_sections_fails() {
        let mut state = SessionState::new(1000);
        assert!(matches!(
            Command::next_section().execute(&mut state),
            Err(TransportError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rewind_returns_to_section_start() {
        let (mut state, verse, _) = state_with_sections();
        run(&mut Command::set_active_section(Some(verse)), &mut state);
        state.update_transport(|t| {
            t.seek(250);
        });

        let mut command = Command::rewind();
        run(&mut command, &mut state);
        assert_eq!(state.transport_state().position, 100);

        command.undo(&mut state).unwrap();
        assert_eq!(state.transport_state().position, 250);
    }

    #[test]
    fn test_rewind_without_section_goes_to_song_start() {
        let mut state = SessionState::new(1000);
        state.update_transport(|t| {
            t.seek(500);
        });
        run(&mut Command::rewind(), &mut state);
        assert_eq!(state.transport_state().position, 0);
    }

    #[test]
    fn test_update_active_section_refreshes_transport() {
        let (mut state, verse, _) = state_with_sections();
        run(&mut Command::set_active_section(Some(verse)), &mut state);

        let mut command = Command::update_section(verse, SectionPatch::bounds(150, 350));
        run(&mut command, &mut state);
        let active = state.transport_state().active.unwrap();
        assert_eq!((active.start_frame, active.end_frame), (150, 350));

        command.undo(&mut state).unwrap();
        let active = state.transport_state().active.unwrap();
        assert_eq!((active.start_frame, active.end_frame), (100, 300));
        assert_eq!(state.sections.get(verse).unwrap().end_frame, 300);
    }

    #[test]
    fn test_update_with_invalid_range_changes_nothing() {
        let (mut state, verse, _) = state_with_sections();
        let before = state.sections.clone();

        let mut command = Command::update_section(verse, SectionPatch::bounds(300, 100));
        assert!(matches!(
            command.execute(&mut state),
            Err(TransportError::InvalidRange { .. })
        ));
        assert_eq!(state.sections, before);
    }

    #[test]
    fn test_delete_active_section_and_undo() {
        let (mut state, _, chorus) = state_with_sections();
        run(&mut Command::set_active_section(Some(chorus)), &mut state);

        let mut command = Command::delete_section(chorus);
        run(&mut command, &mut state);
        assert!(!state.sections.contains(chorus));
        assert_eq!(state.transport_state().active, None);

        command.undo(&mut state).unwrap();
        assert_eq!(state.sections.get(chorus).unwrap().name, "Chorus");
        assert_eq!(state.transport_state().active_section_id(), Some(chorus));
        assert_eq!(state.transport_state().count_in_remaining, Some(50));
    }

    #[test]
    fn test_create_section_undo_clears_active() {
        let mut state = SessionState::new(1000);
        let mut command = Command::create_section(NewSection::new("Solo", 0, 500));
        run(&mut command, &mut state);

        let id = command.created_section_id().unwrap();
        run(&mut Command::set_active_section(Some(id)), &mut state);

        command.undo(&mut state).unwrap();
        assert!(state.sections.is_empty());
        assert_eq!(state.transport_state().active, None);
    }

    #[test]
    fn test_undo_before_execute_fails() {
        let mut state = SessionState::new(1000);
        assert!(Command::set_loop_delay(10).undo(&mut state).is_err());
    }

    #[test]
    fn test_loop_toggle_and_delay() {
        let mut state = SessionState::new(1000);

        let mut toggle = Command::toggle_loop();
        run(&mut toggle, &mut state);
        assert!(!state.transport_state().loop_enabled);
        toggle.undo(&mut state).unwrap();
        assert!(state.transport_state().loop_enabled);

        let mut delay = Command::set_loop_delay(480);
        run(&mut delay, &mut state);
        assert_eq!(state.transport_state().loop_delay_frames, 480);
        delay.undo(&mut state).unwrap();
        assert_eq!(state.transport_state().loop_delay_frames, 0);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Command::set_playing(true).description(), "Play");
        assert_eq!(Command::set_speed(0.5).description(), "Set Speed to 0.50x");
        assert_eq!(
            Command::delete_section(SectionId(4)).description(),
            "Delete Section #4"
        );
    }
}
