//! Fuzzing tests for MIDI parsing and routing
//!
//! Random and malformed data must never panic the parser, and whatever the
//! router makes of it must leave the session in a valid state.

use practice_transport::midi::{MidiEvent, MidiEventRouter, Routed};
use practice_transport::{Session, Settings, SongInfo};
use rand::Rng;

/// Fuzz the MIDI parser with random byte sequences
#[test]
fn fuzz_midi_parser_random_bytes() {
    let mut rng = rand::thread_rng();

    for _ in 0..1000 {
        let length = rng.gen_range(1..=128);
        let random_bytes: Vec<u8> = (0..length).map(|_| rng.gen_range(0..=255)).collect();

        // Should not panic, even with garbage data
        let _ = MidiEvent::from_bytes(&random_bytes);
    }
}

/// Random controller traffic through a live session
#[test]
fn fuzz_router_keeps_session_valid() {
    let mut rng = rand::thread_rng();
    let song_length = 48_000 * 30;
    let mut session =
        Session::new(SongInfo::new("Fuzz", song_length, 48_000), &Settings::default()).unwrap();
    session.create_section(Some("A"), 0, 48_000).unwrap();
    session.create_section(Some("B"), 96_000, 192_000).unwrap();

    for _ in 0..2000 {
        let status = [0x80u8, 0x90, 0xB0, 0xE0][rng.gen_range(0..4)] | rng.gen_range(0..=15);
        let bytes = [status, rng.gen_range(55..=70), rng.gen_range(0..=127)];

        if let Some(event) = MidiEvent::from_bytes(&bytes) {
            // Rejections are fine; panics and invalid state are not
            let _ = session.handle_midi(&event);
        }

        let snapshot = session.snapshot();
        assert!(snapshot.position <= song_length);
        assert!((0.25..=2.0).contains(&snapshot.speed));
        if let Some(id) = snapshot.active_section_id {
            assert!(session.sections().contains(id));
        }
    }
}

/// Test edge cases in MIDI parsing
#[test]
fn test_midi_parser_edge_cases() {
    assert!(MidiEvent::from_bytes(&[]).is_none());
    assert!(MidiEvent::from_bytes(&[0x40]).is_none());

    // System real-time messages are ignored
    assert!(MidiEvent::from_bytes(&[0xF8]).is_none());
    assert!(MidiEvent::from_bytes(&[0xFA]).is_none());
}

/// Test malformed messages
#[test]
fn test_midi_parser_malformed_messages() {
    // Incomplete NoteOn (missing velocity)
    assert!(MidiEvent::from_bytes(&[0x90, 0x40]).is_none());

    // Incomplete Control Change (missing value)
    assert!(MidiEvent::from_bytes(&[0xB0, 0x07]).is_none());

    // Incomplete Pitch Bend (missing MSB)
    assert!(MidiEvent::from_bytes(&[0xE0, 0x00]).is_none());
}

/// Test maximum values
#[test]
fn test_midi_parser_maximum_values() {
    let result = MidiEvent::from_bytes(&[0x90, 0x7F, 0x7F]);
    assert!(matches!(
        result,
        Some(MidiEvent::NoteOn {
            note: 0x7F,
            velocity: 0x7F
        })
    ));

    let result = MidiEvent::from_bytes(&[0x90, 0x00, 0x00]);
    assert!(matches!(result, Some(MidiEvent::NoteOff { note: 0x00 })));
}

/// Stress test with many messages
#[test]
fn test_midi_parser_many_messages() {
    for i in 0..1000 {
        let channel = (i % 16) as u8;
        let note = (i % 128) as u8;
        let velocity = (i % 128) as u8;

        let result = MidiEvent::from_bytes(&[0x90 | channel, note, velocity]);

        if velocity == 0 {
            assert!(matches!(result, Some(MidiEvent::NoteOff { note: n }) if n == note));
        } else {
            assert!(
                matches!(result, Some(MidiEvent::NoteOn { note: n, velocity: v }) if n == note && v == velocity)
            );
        }
    }
}

/// Unsupported message types are not errors, just ignored
#[test]
fn test_unsupported_messages_are_ignored() {
    let mut router = MidiEventRouter::default();

    for bytes in [[0xA0, 0x40, 0x40], [0xC0, 0x05, 0x00], [0xD0, 0x40, 0x00]] {
        assert!(MidiEvent::from_bytes(&bytes).is_none());
    }
    // Pedal release below the threshold
    let release = MidiEvent::ControlChange {
        controller: 64,
        value: 0,
    };
    assert_eq!(router.route(&release), Routed::Ignored);
}
