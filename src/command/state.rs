// SessionState - What commands are allowed to mutate
//
// Narrow context handed to commands: the song's section store and the
// shared transport handle. Nothing else (no device handles, no settings).

use std::sync::Arc;

use crate::section::SectionStore;
use crate::transport::{SharedTransport, TransportState};

/// Mutable song-scoped state
pub struct SessionState {
    /// Owned exclusively here; the audio thread never touches it
    pub sections: SectionStore,

    /// Shared with the audio thread's LoopController
    transport: Arc<SharedTransport>,
}

impl SessionState {
    /// Fresh state for a song of `song_length` frames
    pub fn new(song_length: u64) -> Self {
        Self {
            sections: SectionStore::new(song_length),
            transport: SharedTransport::new(song_length),
        }
    }

    /// Build around an existing transport handle
    pub fn with_transport(sections: SectionStore, transport: Arc<SharedTransport>) -> Self {
        Self {
            sections,
            transport,
        }
    }

    pub fn song_length(&self) -> u64 {
        self.sections.song_length()
    }

    /// Handle to pass to the audio thread
    pub fn transport(&self) -> &Arc<SharedTransport> {
        &self.transport
    }

    /// Consistent copy of the transport state
    pub fn transport_state(&self) -> TransportState {
        self.transport.snapshot()
    }

    /// Short critical section on the transport
    pub fn update_transport<R>(&self, f: impl FnOnce(&mut TransportState) -> R) -> R {
        self.transport.update(f)
    }
}
