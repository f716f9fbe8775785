//! Integration test: transport, loop and undo scenarios
//!
//! Drives a session through the manual clock the way the audio callback
//! would, checking loop timing, section validation and undo/redo laws.

use practice_transport::clock::{ClockSource, ManualClock};
use practice_transport::view::DragGesture;
use practice_transport::{
    Command, NewSection, PlaybackPhase, SectionPatch, SectionStore, Session, Settings, SongInfo,
    TransportError,
};
use rand::Rng;

const SONG_LENGTH: u64 = 1000;

fn session(song_length: u64) -> Session {
    let mut settings = Settings::default();
    settings.loop_delay = 0.0;
    Session::new(SongInfo::new("Scenario", song_length, 1000), &settings).unwrap()
}

fn started_clock(session: &Session) -> ManualClock {
    let mut clock = ManualClock::new(1000);
    clock.start(Box::new(session.clock())).unwrap();
    clock
}

#[test]
fn test_valid_ranges_round_trip() {
    let mut rng = rand::thread_rng();
    let mut store = SectionStore::new(SONG_LENGTH);

    for i in 0..500 {
        let start = rng.gen_range(0..SONG_LENGTH);
        let end = rng.gen_range(start + 1..=SONG_LENGTH);
        let name = format!("Section {}", i);

        let id = store.create(&name, start, end).unwrap();
        let section = store.get(id).unwrap();
        assert_eq!(section.name, name);
        assert_eq!((section.start_frame, section.end_frame), (start, end));
    }
}

#[test]
fn test_invalid_ranges_are_rejected() {
    let mut rng = rand::thread_rng();
    let mut store = SectionStore::new(SONG_LENGTH);
    let id = store.create("Anchor", 10, 20).unwrap();
    let before = store.clone();

    for _ in 0..500 {
        let (start, end) = match rng.gen_range(0..3) {
            0 => {
                // start >= end
                let end = rng.gen_range(0..SONG_LENGTH);
                (rng.gen_range(end..=SONG_LENGTH), end)
            }
            1 => (rng.gen_range(0..SONG_LENGTH), rng.gen_range(SONG_LENGTH + 1..SONG_LENGTH * 3)),
            _ => {
                let start = rng.gen_range(SONG_LENGTH..SONG_LENGTH * 2);
                (start, start + rng.gen_range(1..100))
            }
        };

        assert!(matches!(
            store.create("Bad", start, end),
            Err(TransportError::InvalidRange { .. })
        ));
        assert!(matches!(
            store.update(id, &SectionPatch::bounds(start, end)),
            Err(TransportError::InvalidRange { .. })
        ));
        assert_eq!(store, before);
    }
}

#[test]
fn test_looping_is_drift_free() {
    let mut session = session(SONG_LENGTH);
    let id = session.create_section(Some("Loop"), 100, 500).unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);

    // Offset inside the loop, then one full period
    clock.advance(37).unwrap();
    clock.run(400, 64);
    let after_one = session.snapshot().position;
    assert_eq!(after_one, 137);

    for periods in 2..=50 {
        clock.run(400, 64);
        let position = session.snapshot().position;
        assert_eq!(position % 400, after_one % 400, "drift after {} periods", periods);
        assert_eq!(position, after_one);
    }
}

#[test]
fn test_loop_period_is_exact_with_fractional_speed() {
    let mut session = session(SONG_LENGTH);
    let id = session.create_section(Some("Loop"), 100, 500).unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_speed(0.75)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);

    // 400 loop frames at 0.75x take 1600/3 clock frames; 1600 = three periods
    for block in [1u64, 7, 64, 333] {
        let start = session.snapshot().position;
        clock.run(1600, block);
        assert_eq!(session.snapshot().position, start);
    }
}

#[test]
fn test_wrap_scenario() {
    let mut session = session(SONG_LENGTH);
    let a = session.create_section(Some("A"), 200, 600).unwrap();
    session.select_section(Some(a)).unwrap();
    assert_eq!(session.snapshot().position, 200);

    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);
    clock.run(500, 100);
    assert_eq!(session.snapshot().position, 300);
}

#[test]
fn test_section_without_loop_plays_through() {
    let mut session = session(SONG_LENGTH);
    let id = session.sections().next_id();
    session
        .execute(Command::create_section(
            NewSection::new("NoLoop", 200, 600).with_loop(false),
        ))
        .unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);

    clock.run(500, 100);
    assert_eq!(session.snapshot().position, 700);

    // Turning the section's loop on applies from the next tick
    session.request_seek(500).unwrap();
    session
        .request_section_edit(
            id,
            SectionPatch {
                loop_enabled: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    clock.run(150, 50);
    assert_eq!(session.snapshot().position, 250);
    assert_eq!(session.snapshot().active_section_id, Some(id));
}

#[test]
fn test_speed_scenario() {
    let mut session = session(SONG_LENGTH);
    assert!(matches!(
        session.execute(Command::set_speed(0.0)),
        Err(TransportError::InvalidParameter(_))
    ));

    session.execute(Command::set_speed(2.0)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);
    clock.advance(50).unwrap();
    assert_eq!(session.snapshot().position, 100);
}

#[test]
fn test_negative_delta_rejected() {
    let session = session(SONG_LENGTH);
    let mut clock = started_clock(&session);
    assert!(matches!(
        clock.advance(-10),
        Err(TransportError::InvalidParameter(_))
    ));
}

#[test]
fn test_song_end_stops_playback() {
    let mut session = session(SONG_LENGTH);
    session.request_seek(900).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);

    clock.run(250, 64);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.position, SONG_LENGTH);
    assert_eq!(snapshot.phase, PlaybackPhase::Stopped);
}

#[test]
fn test_count_in_delays_playback() {
    let mut session = session(SONG_LENGTH);
    let id = session
        .create_section(Some("Counted"), 200, 600)
        .unwrap();
    session
        .request_section_edit(
            id,
            SectionPatch {
                count_in_frames: Some(100),
                ..Default::default()
            },
        )
        .unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();
    let mut clock = started_clock(&session);

    clock.advance(60).unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, PlaybackPhase::CountingIn);
    assert_eq!(snapshot.position, 200);
    assert_eq!(snapshot.count_in_remaining, Some(40));

    // 40 frames finish the count-in, 10 move the playhead
    clock.advance(50).unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, PlaybackPhase::Playing);
    assert_eq!(snapshot.position, 210);

    // Wrapping re-arms the count-in
    clock.advance(390).unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.position, 200);
    assert_eq!(snapshot.phase, PlaybackPhase::CountingIn);
}

#[test]
fn test_undo_redo_inverse_law() {
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let mut session = session(SONG_LENGTH);
        let n = rng.gen_range(1..30);
        let mut applied = 0;

        for _ in 0..n {
            let sections = session.sections().list().into_iter().map(|s| s.id).collect::<Vec<_>>();
            let pick = |rng: &mut rand::rngs::ThreadRng| {
                sections.get(rng.gen_range(0..sections.len().max(1))).copied()
            };
            let command = match rng.gen_range(0..10) {
                0 => Command::seek(rng.gen_range(0..SONG_LENGTH * 2)),
                1 => Command::toggle_playback(),
                2 => Command::set_speed(rng.gen_range(0.25..2.0)),
                3 => Command::nudge_speed(if rng.gen_bool(0.5) { 0.05 } else { -0.05 }),
                4 => Command::toggle_loop(),
                5 => {
                    let start = rng.gen_range(0..SONG_LENGTH);
                    let end = rng.gen_range(start + 1..=SONG_LENGTH);
                    Command::create_section(NewSection::new("Part", start, end))
                }
                6 => Command::set_active_section(pick(&mut rng)),
                7 => match pick(&mut rng) {
                    Some(id) => Command::delete_section(id),
                    None => Command::next_section(),
                },
                8 => match pick(&mut rng) {
                    Some(id) => {
                        let start = rng.gen_range(0..SONG_LENGTH);
                        let end = rng.gen_range(start + 1..=SONG_LENGTH);
                        Command::update_section(id, SectionPatch::bounds(start, end))
                    }
                    None => Command::rewind(),
                },
                _ => Command::next_section(),
            };
            if session.execute(command).is_ok() {
                applied += 1;
            }
        }

        let expected_sections = session.export_sections();
        let expected = session.snapshot();

        for _ in 0..applied {
            assert!(session.undo().unwrap().is_some());
        }
        assert!(session.sections().is_empty());
        assert_eq!(session.snapshot().position, 0);
        assert_eq!(session.undo().unwrap(), None);

        for _ in 0..applied {
            assert!(session.redo().unwrap().is_some());
        }
        assert_eq!(session.export_sections(), expected_sections);
        assert_eq!(session.snapshot(), expected);
    }
}

#[test]
fn test_delete_active_section_undo() {
    let mut session = session(SONG_LENGTH);
    let id = session.create_section(Some("Bridge"), 300, 700).unwrap();
    session.select_section(Some(id)).unwrap();

    session.delete_section(id).unwrap();
    assert_eq!(session.snapshot().active_section_id, None);
    assert!(session.sections().get(id).is_none());

    session.undo().unwrap();
    assert_eq!(session.snapshot().active_section_id, Some(id));
    assert_eq!(session.sections().get(id).unwrap().name, "Bridge");

    // Ids are never reused, even after delete
    session.redo().unwrap();
    let next = session.create_section(None, 0, 10).unwrap();
    assert!(next > id);
}

#[test]
fn test_drag_coalesces_into_one_command() {
    let mut session = session(SONG_LENGTH);
    let undo_before = session.history().undo_count();

    let mut drag = DragGesture::position(session.state());
    for step in 1..=30 {
        drag.update(session.state(), step * 10);
    }
    assert_eq!(session.snapshot().position, 300);
    assert_eq!(session.history().undo_count(), undo_before);

    let command = drag.finish().unwrap();
    session.execute(command).unwrap();
    assert_eq!(session.history().undo_count(), undo_before + 1);
    assert_eq!(session.snapshot().position, 300);

    session.undo().unwrap();
    assert_eq!(session.snapshot().position, 0);
}

#[test]
fn test_seek_while_playing_leaves_section() {
    let mut session = session(SONG_LENGTH);
    let id = session.create_section(Some("Verse"), 100, 400).unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();

    session.request_seek(800).unwrap();
    assert_eq!(session.snapshot().active_section_id, None);

    session.undo().unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.active_section_id, Some(id));
    assert_eq!(snapshot.position, 100);
}

#[test]
fn test_snapshots_are_never_torn() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    let mut session = session(100_000);
    let id = session.create_section(Some("Loop"), 1000, 5000).unwrap();
    session.select_section(Some(id)).unwrap();
    session.execute(Command::set_playing(true)).unwrap();

    let clock = session.clock();
    let done = Arc::new(AtomicBool::new(false));
    let audio = {
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                clock.on_tick(64);
            }
        })
    };

    for _ in 0..2000 {
        let snapshot = session.snapshot();
        // While the section is active the playhead is always inside it
        if snapshot.active_section_id == Some(id) {
            assert!((1000..=5000).contains(&snapshot.position));
        }
    }
    done.store(true, Ordering::Relaxed);
    audio.join().unwrap();
}
