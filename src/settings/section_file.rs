// SectionFile - Per-song section list on disk

use crate::section::{SectionRecord, SectionStore};
use crate::settings::config::{SettingsError, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name kept next to a song's audio
pub const SECTION_FILE_NAME: &str = "sections.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFile {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

impl SectionFile {
    pub fn new(title: impl Into<String>, bpm: Option<f64>, sections: Vec<SectionRecord>) -> Self {
        Self {
            title: title.into(),
            bpm,
            sections,
        }
    }

    /// Parse a section file; records are validated on import, not here
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        write_json_atomic(path.as_ref(), self)
    }

    /// Load every record into `store`, or none of them
    pub fn import_into(&self, store: &mut SectionStore) -> Result<(), SettingsError> {
        store.import(self.sections.clone()).inspect_err(|err| {
            tracing::warn!("section file for '{}' rejected: {}", self.title, err);
        })?;
        Ok(())
    }
}
