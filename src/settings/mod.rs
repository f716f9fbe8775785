// Settings collaborator - Preferences and per-song section files

pub mod config;
pub mod section_file;

pub use config::{Settings, SettingsError};
pub use section_file::{SECTION_FILE_NAME, SectionFile};
