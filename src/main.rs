use clap::Parser;
use practice_transport::clock::{ClockSource, DeviceClock};
use practice_transport::messaging::{MIDI_CHANNEL_CAPACITY, create_midi_channel};
use practice_transport::midi::MidiInput;
use practice_transport::settings::{SectionFile, Settings, SettingsError};
use practice_transport::view::{format_progress, frames_to_seconds, seconds_to_frames};
use practice_transport::{Command, PlaybackPhase, Session, SongInfo};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// UI context poll period: MIDI drain + status line
const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STATUS_EVERY: u32 = 50;

/// Headless practice transport: loops sections of a song under MIDI control
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Song length in seconds
    #[arg(long)]
    length: f64,

    #[arg(long, default_value = "Untitled")]
    title: String,

    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    #[arg(long)]
    bpm: Option<f64>,

    /// Section file to load (and save back on exit)
    #[arg(long)]
    sections: Option<PathBuf>,

    /// Settings file (defaults to the platform config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Start playing right away
    #[arg(long)]
    play: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), SettingsError> {
    let settings_path = match args.settings {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let mut settings = Settings::load(&settings_path)?;

    let mut song = SongInfo::new(
        args.title,
        seconds_to_frames(args.length, args.sample_rate),
        args.sample_rate,
    );
    song.bpm = args.bpm;

    let mut session = Session::new(song, &settings)?;
    if let Some(path) = args.sections.as_ref().filter(|path| path.exists()) {
        session.apply_section_file(&SectionFile::load(path)?)?;
        if let Some(name) = settings.current_section.clone() {
            if let Err(e) = session.restore_section_by_name(&name) {
                tracing::debug!("previous section not restored: {}", e);
            }
        }
    }

    let mut clock = DeviceClock::new(args.sample_rate);
    if let Err(e) = clock.start(Box::new(session.clock())) {
        tracing::error!("audio clock unavailable: {}", e);
        return Ok(());
    }

    let (midi_tx, mut midi_rx) = create_midi_channel(MIDI_CHANNEL_CAPACITY);
    let midi = match MidiInput::connect(settings.midi_port.as_deref(), midi_tx) {
        Ok(midi) => Some(midi),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };
    let midi_control = midi.as_ref().is_some_and(MidiInput::is_connected);

    if args.play {
        session.execute(Command::set_playing(true))?;
    }

    let total_seconds = frames_to_seconds(session.song().length_frames, args.sample_rate);
    let mut polls = 0u32;
    loop {
        session.drain_midi(&mut midi_rx);

        let snapshot = session.snapshot();
        polls = polls.wrapping_add(1);
        if polls % STATUS_EVERY == 0 {
            let seconds = frames_to_seconds(snapshot.position, args.sample_rate);
            tracing::info!(
                "{} {:?} x{:.2}",
                format_progress(seconds, total_seconds),
                snapshot.phase,
                snapshot.speed
            );
        }

        // Without a controller nothing can restart playback
        if !midi_control && snapshot.phase == PlaybackPhase::Stopped {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    clock.stop();

    session.store_preferences(&mut settings);
    if let Some(port) = midi.as_ref().and_then(MidiInput::port_name) {
        settings.midi_port = Some(port.to_string());
    }
    settings.save(&settings_path)?;
    if let Some(path) = args.sections {
        session.section_file().save(path)?;
    }
    Ok(())
}
