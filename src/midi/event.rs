// MIDI event types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
    PitchBend { value: i16 },
}

/// What a control surface key or pedal is identified by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "number")]
pub enum MidiTrigger {
    Note(u8),
    Control(u8),
}

/// Control change values above this count as "pressed" (pedal convention)
pub const CONTROL_PRESS_THRESHOLD: u8 = 64;

impl MidiEvent {
    /// Parse a raw MIDI message
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        // Low nibble is the channel; all channels are treated alike
        match status & 0xF0 {
            0x90 => {
                let note = bytes[1];
                let velocity = bytes[2];
                // Velocity 0 = Note Off
                if velocity == 0 {
                    Some(MidiEvent::NoteOff { note })
                } else {
                    Some(MidiEvent::NoteOn { note, velocity })
                }
            }
            0x80 => Some(MidiEvent::NoteOff { note: bytes[1] }),
            0xB0 => Some(MidiEvent::ControlChange {
                controller: bytes[1],
                value: bytes[2],
            }),
            0xE0 => {
                let lsb = bytes[1] as i16;
                let msb = bytes[2] as i16;
                Some(MidiEvent::PitchBend {
                    value: (msb << 7) | lsb,
                })
            }
            _ => None,
        }
    }

    /// The key or pedal this event presses, if it is a press at all
    ///
    /// Note-on with non-zero velocity, or a control change above the
    /// pedal threshold. Releases and pitch bends trigger nothing.
    pub fn trigger(&self) -> Option<MidiTrigger> {
        match *self {
            MidiEvent::NoteOn { note, velocity } if velocity > 0 => Some(MidiTrigger::Note(note)),
            MidiEvent::ControlChange { controller, value } if value > CONTROL_PRESS_THRESHOLD => {
                Some(MidiTrigger::Control(controller))
            }
            _ => None,
        }
    }
}
