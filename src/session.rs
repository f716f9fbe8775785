// Session - Song-scoped transport, sections and history
//
// Owns everything the UI context mutates for the loaded song. The audio
// thread only ever sees the `LoopController` handed out by `clock()`, which
// survives song switches.

use ringbuf::traits::Consumer;

use crate::command::{Command, CommandManager, SessionState, UndoableCommand};
use crate::error::{CommandResult, TransportError};
use crate::messaging::MidiEventConsumer;
use crate::midi::{MidiEvent, MidiEventRouter, Routed};
use crate::section::{
    DEFAULT_SECTION_NAME, NewSection, SectionId, SectionPatch, SectionRecord, SectionStore,
};
use crate::settings::{SectionFile, Settings, SettingsError};
use crate::transport::{LoopController, TransportState, validate_speed};
use crate::view::{Snapshot, frames_to_seconds, seconds_to_frames};

/// What the transport needs to know about a song
#[derive(Debug, Clone, PartialEq)]
pub struct SongInfo {
    pub title: String,
    pub length_frames: u64,
    pub sample_rate: u32,
    /// Tempo used for count-in lengths
    pub bpm: Option<f64>,
}

impl SongInfo {
    pub fn new(title: impl Into<String>, length_frames: u64, sample_rate: u32) -> Self {
        Self {
            title: title.into(),
            length_frames,
            sample_rate,
            bpm: None,
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    /// Frames spanned by `beats` beats, if the tempo is known
    pub fn beats_to_frames(&self, beats: u32) -> Option<u64> {
        let bpm = self.bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0)?;
        let seconds = beats as f64 * 60.0 / bpm;
        Some((seconds * self.sample_rate as f64).round() as u64)
    }
}

pub struct Session {
    song: SongInfo,
    state: SessionState,
    history: CommandManager,
    router: MidiEventRouter,
    count_in_enabled: bool,
    count_in_beats: u32,
}

impl Session {
    /// Start a session for `song` using the stored preferences
    pub fn new(song: SongInfo, settings: &Settings) -> CommandResult<Self> {
        settings.validate()?;

        let state = SessionState::new(song.length_frames);
        let loop_delay = settings.loop_delay_frames(song.sample_rate);
        state.update_transport(|t| {
            t.speed = settings.speed;
            t.set_loop_enabled(settings.loop_playback);
            t.set_loop_delay(loop_delay);
        });

        tracing::info!(
            "session started: '{}' ({} frames @ {} Hz)",
            song.title,
            song.length_frames,
            song.sample_rate
        );

        Ok(Self {
            song,
            state,
            history: CommandManager::new(),
            router: MidiEventRouter::new(settings.midi_mapping.clone()),
            count_in_enabled: settings.count_in,
            count_in_beats: settings.count_in_beats,
        })
    }

    /// Switch songs: sections, active section and history are dropped
    ///
    /// Speed, loop flag and loop delay carry over; the loop delay keeps its
    /// duration in seconds across sample rates.
    pub fn load_song(&mut self, song: SongInfo) {
        let delay_seconds = self.loop_delay_seconds();
        let delay_frames = seconds_to_frames(delay_seconds, song.sample_rate);
        let length = song.length_frames;

        self.state.update_transport(|t| {
            let mut fresh = TransportState::new(length);
            fresh.speed = t.speed;
            fresh.loop_enabled = t.loop_enabled;
            fresh.loop_delay_frames = delay_frames;
            *t = fresh;
        });
        self.state = SessionState::with_transport(
            SectionStore::new(length),
            self.state.transport().clone(),
        );
        self.history.clear();

        tracing::info!("song loaded: '{}' ({} frames)", song.title, length);
        self.song = song;
    }

    pub fn song(&self) -> &SongInfo {
        &self.song
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sections(&self) -> &SectionStore {
        &self.state.sections
    }

    pub fn history(&self) -> &CommandManager {
        &self.history
    }

    pub fn router(&self) -> &MidiEventRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut MidiEventRouter {
        &mut self.router
    }

    /// Tick receiver for the audio thread
    pub fn clock(&self) -> LoopController {
        LoopController::new(self.state.transport().clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Run a command and record it for undo
    pub fn execute(&mut self, command: Command) -> CommandResult<()> {
        self.history.execute(Box::new(command), &mut self.state)
    }

    pub fn undo(&mut self) -> CommandResult<Option<String>> {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> CommandResult<Option<String>> {
        self.history.redo(&mut self.state)
    }

    // ========== Intents from the transport view ==========

    pub fn request_seek(&mut self, frame: u64) -> CommandResult<()> {
        self.execute(Command::seek(frame))
    }

    pub fn request_section_edit(&mut self, id: SectionId, patch: SectionPatch) -> CommandResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.execute(Command::update_section(id, patch))
    }

    /// Create a section, naming it "New Section", "New Section 1", ... when
    /// no name is given
    ///
    /// With the count-in preference on, the section gets a count-in of the
    /// configured beats at the song tempo.
    pub fn create_section(
        &mut self,
        name: Option<&str>,
        start_frame: u64,
        end_frame: u64,
    ) -> CommandResult<SectionId> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.state.sections.unique_name(DEFAULT_SECTION_NAME),
        };
        let new = NewSection::new(name, start_frame, end_frame)
            .with_count_in(self.default_count_in_frames());

        let id = self.state.sections.next_id();
        self.execute(Command::create_section(new))?;
        Ok(id)
    }

    pub fn delete_section(&mut self, id: SectionId) -> CommandResult<()> {
        self.execute(Command::delete_section(id))
    }

    pub fn select_section(&mut self, id: Option<SectionId>) -> CommandResult<()> {
        self.execute(Command::set_active_section(id))
    }

    pub fn set_loop_delay_seconds(&mut self, seconds: f64) -> CommandResult<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(TransportError::InvalidParameter(format!(
                "loop delay must be >= 0 seconds, got {}",
                seconds
            )));
        }
        let frames = seconds_to_frames(seconds, self.song.sample_rate);
        self.execute(Command::set_loop_delay(frames))
    }

    pub fn loop_delay_seconds(&self) -> f64 {
        let frames = self.state.transport_state().loop_delay_frames;
        frames_to_seconds(frames, self.song.sample_rate)
    }

    pub fn count_in_enabled(&self) -> bool {
        self.count_in_enabled
    }

    /// Preference for sections created from now on
    pub fn set_count_in_enabled(&mut self, enabled: bool) {
        self.count_in_enabled = enabled;
    }

    /// Count-in given to new sections (0 when off or the tempo is unknown)
    pub fn default_count_in_frames(&self) -> u64 {
        if !self.count_in_enabled {
            return 0;
        }
        self.song
            .beats_to_frames(self.count_in_beats)
            .unwrap_or(0)
    }

    // ========== MIDI ==========

    /// Route one controller event and run the command it maps to
    pub fn handle_midi(&mut self, event: &MidiEvent) -> CommandResult<Routed> {
        let routed = self.router.route(event);
        if let Routed::Command(_, command) = &routed {
            self.execute(command.clone())?;
        }
        Ok(routed)
    }

    /// Drain the MIDI channel; failed commands are logged and skipped
    pub fn drain_midi(&mut self, events: &mut MidiEventConsumer) -> usize {
        let mut handled = 0;
        while let Some(event) = events.try_pop() {
            match self.handle_midi(&event) {
                Ok(Routed::Ignored) => {}
                Ok(_) => handled += 1,
                Err(err) => tracing::debug!("MIDI command rejected: {}", err),
            }
        }
        handled
    }

    // ========== Settings collaborator ==========

    pub fn export_sections(&self) -> Vec<SectionRecord> {
        self.state.sections.export()
    }

    /// Replace all sections with `records`, or change nothing
    ///
    /// A successful import drops the active section and the history, which
    /// may refer to sections that no longer exist.
    pub fn import_sections(&mut self, records: Vec<SectionRecord>) -> CommandResult<()> {
        let count = records.len();
        self.state.sections.import(records).inspect_err(|err| {
            tracing::warn!("section import rejected: {}", err);
        })?;
        self.state.update_transport(|t| t.set_active_section(None));
        self.history.clear();
        tracing::info!("imported {} sections", count);
        Ok(())
    }

    pub fn section_file(&self) -> SectionFile {
        SectionFile::new(self.song.title.clone(), self.song.bpm, self.export_sections())
    }

    /// Import a section file; its tempo fills in an unknown song tempo
    pub fn apply_section_file(&mut self, file: &SectionFile) -> Result<(), SettingsError> {
        self.import_sections(file.sections.clone())?;
        if self.song.bpm.is_none() {
            self.song.bpm = file.bpm;
        }
        Ok(())
    }

    /// Reselect a section by name without recording history
    pub fn restore_section_by_name(&mut self, name: &str) -> CommandResult<()> {
        let id = self
            .state
            .sections
            .find_by_name(name)
            .map(|section| section.id)
            .ok_or_else(|| TransportError::InvalidParameter(format!("no section named '{}'", name)))?;
        Command::set_active_section(Some(id)).execute(&mut self.state)
    }

    /// Write the session's preferences back into `settings`
    pub fn store_preferences(&self, settings: &mut Settings) {
        let transport = self.state.transport_state();
        if validate_speed(transport.speed).is_ok() {
            settings.speed = transport.speed;
        }
        settings.loop_playback = transport.loop_enabled;
        settings.loop_delay = self.loop_delay_seconds();
        settings.count_in = self.count_in_enabled;
        settings.count_in_beats = self.count_in_beats;
        settings.current_song = Some(self.song.title.clone());
        settings.current_section = transport
            .active_section_id()
            .and_then(|id| self.state.sections.get(id))
            .map(|section| section.name.clone());
        settings.midi_mapping = self.router.mapping().clone();
    }
}
