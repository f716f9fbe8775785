// Section module - Named loop regions and their store

pub mod store;
pub mod types;

pub use store::{DEFAULT_SECTION_NAME, SectionStore};
pub use types::{LoopRegion, NewSection, Section, SectionId, SectionPatch, SectionRecord};
