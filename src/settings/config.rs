// Settings - User preferences persisted as JSON

use crate::error::TransportError;
use crate::midi::MidiMapping;
use crate::transport::validate_speed;
use crate::view::seconds_to_frames;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "practice_transport";
const SETTINGS_FILE: &str = "settings.json";

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rejected: {0}")]
    Rejected(#[from] TransportError),

    #[error("No configuration directory on this platform")]
    NoConfigDir,
}

/// Global preferences; song-independent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub songs_folder: Option<PathBuf>,
    pub current_song: Option<String>,
    /// Section to reselect when the song is loaded again
    pub current_section: Option<String>,
    pub speed: f64,
    /// Pause inserted at each loop wrap, in seconds
    pub loop_delay: f64,
    pub loop_playback: bool,
    /// Give new sections a count-in
    pub count_in: bool,
    pub count_in_beats: u32,
    pub midi_port: Option<String>,
    pub midi_mapping: MidiMapping,
}

/// Defaults of a fresh install
///
/// The loop delay defaults to half a second: every loop wrap pauses that
/// long before the section plays again. Set `loop_delay` to 0 for a seamless
/// loop where the overshoot carries straight past the section start.
impl Default for Settings {
    fn default() -> Self {
        Self {
            songs_folder: None,
            current_song: None,
            current_section: None,
            speed: 1.0,
            loop_delay: 0.5,
            loop_playback: true,
            count_in: false,
            count_in_beats: 4,
            midi_port: None,
            midi_mapping: MidiMapping::default(),
        }
    }
}

impl Settings {
    /// `<config dir>/practice_transport/settings.json`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Load settings; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        tracing::info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Save as pretty JSON, replacing the file atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        self.validate()?;
        write_json_atomic(path.as_ref(), self)
    }

    /// Reject values the transport would refuse
    pub fn validate(&self) -> Result<(), TransportError> {
        validate_speed(self.speed)?;
        if !self.loop_delay.is_finite() || self.loop_delay < 0.0 {
            return Err(TransportError::InvalidParameter(format!(
                "loop delay must be >= 0 seconds, got {}",
                self.loop_delay
            )));
        }
        Ok(())
    }

    pub fn loop_delay_frames(&self, sample_rate: u32) -> u64 {
        seconds_to_frames(self.loop_delay, sample_rate)
    }
}

/// Write JSON to a sibling temp file, then rename it over `path`
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
