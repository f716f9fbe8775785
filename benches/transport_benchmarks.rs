use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use practice_transport::section::{LoopRegion, SectionId};
use practice_transport::transport::{SharedTransport, TransportState, advance};
use practice_transport::{Command, Session, Settings, SongInfo};

const SONG_LENGTH: u64 = 48_000 * 240;

fn looping_state(speed: f64) -> TransportState {
    let mut state = TransportState::new(SONG_LENGTH);
    state.set_active_section(Some(LoopRegion {
        id: SectionId(1),
        start_frame: 48_000,
        end_frame: 48_000 * 9,
        loop_enabled: true,
        count_in_frames: 0,
    }));
    state.speed = speed;
    state.set_playing(true);
    state
}

/// Benchmark the per-tick loop decision (runs on the audio callback)
fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");

    for buffer_size in [64u64, 256, 1024] {
        for speed in [1.0, 0.75] {
            let mut state = looping_state(speed);
            group.bench_with_input(
                BenchmarkId::new(format!("speed_{}", speed), buffer_size),
                &buffer_size,
                |b, &size| {
                    b.iter(|| advance(black_box(&mut state), black_box(size)));
                },
            );
        }
    }
    group.finish();
}

/// Benchmark the full tick path including the try_lock handoff
fn bench_shared_tick(c: &mut Criterion) {
    let transport = SharedTransport::with_state(looping_state(1.0));

    c.bench_function("shared_tick_512", |b| {
        b.iter(|| transport.tick(black_box(512)));
    });

    c.bench_function("snapshot", |b| {
        b.iter(|| black_box(transport.snapshot()));
    });
}

/// Benchmark command execution plus undo (UI context)
fn bench_command_roundtrip(c: &mut Criterion) {
    let mut session =
        Session::new(SongInfo::new("Bench", SONG_LENGTH, 48_000), &Settings::default()).unwrap();
    for i in 0..32 {
        session
            .create_section(None, i * 48_000, (i + 4) * 48_000)
            .unwrap();
    }

    c.bench_function("next_section_undo", |b| {
        b.iter(|| {
            session.execute(Command::next_section()).unwrap();
            session.undo().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_advance,
    bench_shared_tick,
    bench_command_roundtrip
);
criterion_main!(benches);
