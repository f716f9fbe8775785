// MidiEventRouter - Turns controller presses into transport commands
//
// Produces the same `Command` values the UI builds, so the command layer
// has one mutation path whatever the input source.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::{Command, SPEED_STEP};
use crate::midi::event::{MidiEvent, MidiTrigger};

/// Transport actions a controller can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiAction {
    PlayPause,
    RewindToSectionStart,
    NextSection,
    PreviousSection,
    ToggleLoop,
    SpeedUp,
    SpeedDown,
}

impl MidiAction {
    pub const ALL: [MidiAction; 7] = [
        MidiAction::PlayPause,
        MidiAction::RewindToSectionStart,
        MidiAction::NextSection,
        MidiAction::PreviousSection,
        MidiAction::ToggleLoop,
        MidiAction::SpeedUp,
        MidiAction::SpeedDown,
    ];

    /// The command this action issues
    pub fn command(self) -> Command {
        match self {
            MidiAction::PlayPause => Command::toggle_playback(),
            MidiAction::RewindToSectionStart => Command::rewind(),
            MidiAction::NextSection => Command::next_section(),
            MidiAction::PreviousSection => Command::previous_section(),
            MidiAction::ToggleLoop => Command::toggle_loop(),
            MidiAction::SpeedUp => Command::nudge_speed(SPEED_STEP),
            MidiAction::SpeedDown => Command::nudge_speed(-SPEED_STEP),
        }
    }
}

impl fmt::Display for MidiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MidiAction::PlayPause => "Play/Pause",
            MidiAction::RewindToSectionStart => "Rewind",
            MidiAction::NextSection => "Next Section",
            MidiAction::PreviousSection => "Previous Section",
            MidiAction::ToggleLoop => "Toggle Loop",
            MidiAction::SpeedUp => "Speed Up",
            MidiAction::SpeedDown => "Speed Down",
        };
        f.write_str(name)
    }
}

/// One trigger bound to one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiBinding {
    pub trigger: MidiTrigger,
    pub action: MidiAction,
}

/// Trigger-to-action table, persisted with the settings
///
/// A trigger maps to at most one action; an action may have several
/// triggers (a key and a pedal, say).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MidiMapping {
    bindings: Vec<MidiBinding>,
}

impl Default for MidiMapping {
    fn default() -> Self {
        let defaults = [
            (60, MidiAction::PlayPause),
            (62, MidiAction::RewindToSectionStart),
            (64, MidiAction::NextSection),
            (65, MidiAction::PreviousSection),
            (66, MidiAction::ToggleLoop),
            (67, MidiAction::SpeedUp),
            (68, MidiAction::SpeedDown),
        ];
        Self {
            bindings: defaults
                .into_iter()
                .map(|(note, action)| MidiBinding {
                    trigger: MidiTrigger::Note(note),
                    action,
                })
                .collect(),
        }
    }
}

impl MidiMapping {
    /// Mapping with no bindings
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn action_for(&self, trigger: MidiTrigger) -> Option<MidiAction> {
        self.bindings
            .iter()
            .find(|binding| binding.trigger == trigger)
            .map(|binding| binding.action)
    }

    /// Triggers currently bound to `action`
    pub fn triggers_for(&self, action: MidiAction) -> Vec<MidiTrigger> {
        self.bindings
            .iter()
            .filter(|binding| binding.action == action)
            .map(|binding| binding.trigger)
            .collect()
    }

    /// Bind `trigger` to `action`, replacing whatever it was bound to
    pub fn bind(&mut self, trigger: MidiTrigger, action: MidiAction) {
        self.bindings.retain(|binding| binding.trigger != trigger);
        self.bindings.push(MidiBinding { trigger, action });
    }

    /// Remove every trigger bound to `action`
    pub fn unbind_action(&mut self, action: MidiAction) {
        self.bindings.retain(|binding| binding.action != action);
    }

    pub fn bindings(&self) -> &[MidiBinding] {
        &self.bindings
    }
}

/// Outcome of routing one event
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// A mapped press: execute this command
    Command(MidiAction, Command),
    /// Learn mode consumed the press and bound it
    Learned(MidiAction, MidiTrigger),
    /// Release, unmapped number or non-trigger event
    Ignored,
}

/// Maps inbound MIDI events onto commands
#[derive(Debug, Clone, Default)]
pub struct MidiEventRouter {
    mapping: MidiMapping,
    learning: Option<MidiAction>,
}

impl MidiEventRouter {
    pub fn new(mapping: MidiMapping) -> Self {
        Self {
            mapping,
            learning: None,
        }
    }

    pub fn mapping(&self) -> &MidiMapping {
        &self.mapping
    }

    pub fn set_mapping(&mut self, mapping: MidiMapping) {
        self.mapping = mapping;
    }

    /// Arm learn mode: the next press gets bound to `action`
    pub fn learn(&mut self, action: MidiAction) {
        self.learning = Some(action);
    }

    pub fn cancel_learn(&mut self) {
        self.learning = None;
    }

    pub fn learning(&self) -> Option<MidiAction> {
        self.learning
    }

    pub fn route(&mut self, event: &MidiEvent) -> Routed {
        let Some(trigger) = event.trigger() else {
            return Routed::Ignored;
        };

        if let Some(action) = self.learning.take() {
            // Learning replaces the action's previous binding
            self.mapping.unbind_action(action);
            self.mapping.bind(trigger, action);
            tracing::info!("MIDI learn: {:?} -> {}", trigger, action);
            return Routed::Learned(action, trigger);
        }

        match self.mapping.action_for(trigger) {
            Some(action) => {
                tracing::debug!("MIDI {:?} -> {}", trigger, action);
                Routed::Command(action, action.command())
            }
            None => Routed::Ignored,
        }
    }
}
