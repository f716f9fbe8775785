// SectionStore - Owns the song's loop sections
//
// Only the UI context mutates the store. The audio thread never reads it
// directly: the active section's bounds are mirrored into the transport
// state by the command layer.

use std::collections::{BTreeMap, HashSet};

use crate::error::{CommandResult, TransportError};
use crate::section::types::{NewSection, Section, SectionId, SectionPatch, SectionRecord};

/// Default base name used by the "new section" action
pub const DEFAULT_SECTION_NAME: &str = "New Section";

/// Ordered collection of named loop sections for one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStore {
    song_length: u64,
    sections: BTreeMap<SectionId, Section>,
    /// Next id to hand out; never decremented
    next_id: u64,
}

impl SectionStore {
    /// Create an empty store for a song of `song_length` frames
    pub fn new(song_length: u64) -> Self {
        Self {
            song_length,
            sections: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn song_length(&self) -> u64 {
        self.song_length
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Id the next successful create will receive
    pub fn next_id(&self) -> SectionId {
        SectionId(self.next_id)
    }

    /// Check the `0 <= start < end <= song_length` invariant
    pub fn validate_range(&self, start: u64, end: u64) -> CommandResult<()> {
        if start >= end || end > self.song_length {
            return Err(TransportError::InvalidRange {
                start,
                end,
                song_length: self.song_length,
            });
        }
        Ok(())
    }

    /// Create a looping section without count-in
    pub fn create(&mut self, name: &str, start: u64, end: u64) -> CommandResult<SectionId> {
        self.create_section(NewSection::new(name, start, end))
    }

    /// Create a section from full parameters and return its new id
    pub fn create_section(&mut self, new: NewSection) -> CommandResult<SectionId> {
        self.validate_range(new.start_frame, new.end_frame)?;
        let name = normalize_name(&new.name)?;

        let id = SectionId(self.next_id);
        self.next_id = id_after(id)?;
        self.sections.insert(
            id,
            Section {
                id,
                name,
                start_frame: new.start_frame,
                end_frame: new.end_frame,
                loop_enabled: new.loop_enabled,
                count_in_frames: new.count_in_frames,
            },
        );
        Ok(id)
    }

    /// Apply a patch and return the section as it was before
    pub fn update(&mut self, id: SectionId, patch: &SectionPatch) -> CommandResult<Section> {
        let current = self.lookup(id)?;
        let mut updated = patch.applied_to(current);
        self.validate_range(updated.start_frame, updated.end_frame)?;
        updated.name = normalize_name(&updated.name)?;

        // lookup() above guarantees the entry exists
        let previous = std::mem::replace(
            self.sections.get_mut(&id).ok_or(TransportError::NotFound(id))?,
            updated,
        );
        Ok(previous)
    }

    /// Remove a section and hand it back (for undo)
    pub fn delete(&mut self, id: SectionId) -> CommandResult<Section> {
        self.sections.remove(&id).ok_or(TransportError::NotFound(id))
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// Like `get`, but an unknown id is an error
    pub fn lookup(&self, id: SectionId) -> CommandResult<&Section> {
        self.sections.get(&id).ok_or(TransportError::NotFound(id))
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.sections.contains_key(&id)
    }

    /// Sections ordered by start frame (ties broken by id)
    pub fn list(&self) -> Vec<&Section> {
        let mut list: Vec<&Section> = self.sections.values().collect();
        list.sort_by_key(|s| (s.start_frame, s.id));
        list
    }

    /// Reinsert a section under its original id
    ///
    /// Used by undo of a delete and redo of a create. The id counter only
    /// moves forward.
    pub fn restore(&mut self, section: Section) -> CommandResult<()> {
        self.validate_range(section.start_frame, section.end_frame)?;
        if self.sections.contains_key(&section.id) {
            return Err(TransportError::InvalidParameter(format!(
                "section {} already exists",
                section.id
            )));
        }
        self.next_id = self.next_id.max(id_after(section.id)?);
        self.sections.insert(section.id, section);
        Ok(())
    }

    /// First free name among "base", "base 1", "base 2", ...
    pub fn unique_name(&self, base: &str) -> String {
        let taken: HashSet<&str> = self.sections.values().map(|s| s.name.as_str()).collect();
        if !taken.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{} {}", base, i))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    /// Section following `current` in list order, wrapping around
    ///
    /// With no current section (or a stale one) the first section is returned.
    pub fn next_after(&self, current: Option<SectionId>) -> Option<SectionId> {
        let list = self.list();
        let index = current.and_then(|id| list.iter().position(|s| s.id == id));
        match index {
            Some(i) => list.get((i + 1) % list.len()).map(|s| s.id),
            None => list.first().map(|s| s.id),
        }
    }

    /// Section preceding `current` in list order, wrapping around
    ///
    /// With no current section (or a stale one) the last section is returned.
    pub fn previous_before(&self, current: Option<SectionId>) -> Option<SectionId> {
        let list = self.list();
        let index = current.and_then(|id| list.iter().position(|s| s.id == id));
        match index {
            Some(i) => list.get((i + list.len() - 1) % list.len()).map(|s| s.id),
            None => list.last().map(|s| s.id),
        }
    }

    /// Find a section by exact name
    pub fn find_by_name(&self, name: &str) -> Option<&Section> {
        self.list().into_iter().find(|s| s.name == name)
    }

    /// Export all sections as records, ordered like `list()`
    pub fn export(&self) -> Vec<SectionRecord> {
        self.list().into_iter().cloned().collect()
    }

    /// Replace the store contents with a batch of records
    ///
    /// The whole batch is validated first; on the first violation nothing is
    /// loaded and the store is left as it was.
    pub fn import(&mut self, records: Vec<SectionRecord>) -> CommandResult<()> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut next_id = self.next_id;
        for record in &records {
            self.validate_range(record.start_frame, record.end_frame)?;
            normalize_name(&record.name)?;
            next_id = next_id.max(id_after(record.id)?);
            if !seen.insert(record.id) {
                return Err(TransportError::InvalidParameter(format!(
                    "duplicate section id {}",
                    record.id
                )));
            }
        }

        self.sections = records
            .into_iter()
            .map(|mut r| {
                r.name = r.name.trim().to_string();
                (r.id, r)
            })
            .collect();
        self.next_id = next_id;
        Ok(())
    }
}

/// Counter value following `id`; the last representable id has none
fn id_after(id: SectionId) -> CommandResult<u64> {
    id.0.checked_add(1).ok_or_else(|| {
        TransportError::InvalidParameter(format!("section id {} out of range", id))
    })
}

fn normalize_name(name: &str) -> CommandResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TransportError::InvalidParameter(
            "section name cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}
