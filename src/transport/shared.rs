// SharedTransport - Transport state shared between the UI and audio threads
//
// A single short-held mutex guards the whole `TransportState`, so every
// snapshot is a value that really existed (never torn). The audio thread only
// ever uses `try_lock`: if the UI holds the lock, the tick's frames are parked
// in an atomic counter and folded in by whoever takes the lock next.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use crate::transport::loop_controller::advance;
use crate::transport::state::TransportState;

/// Thread-safe transport handle
#[derive(Debug)]
pub struct SharedTransport {
    state: Mutex<TransportState>,
    /// Clock frames delivered while the state was locked by the UI
    pending_frames: AtomicU64,
}

impl SharedTransport {
    /// Create a stopped transport for a song of `song_length` frames
    pub fn new(song_length: u64) -> Arc<Self> {
        Self::with_state(TransportState::new(song_length))
    }

    /// Create from an existing state (used when a song is reloaded)
    pub fn with_state(state: TransportState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            pending_frames: AtomicU64::new(0),
        })
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> TransportState {
        *self.lock()
    }

    /// Mutate the state from the UI context
    ///
    /// The closure runs under the lock and must stay short: no I/O, no
    /// dialogs, no waiting on other threads.
    pub fn update<R>(&self, f: impl FnOnce(&mut TransportState) -> R) -> R {
        let mut state = self.lock();
        f(&mut state)
    }

    /// Audio-thread entry point; never blocks
    pub fn tick(&self, frame_delta: u64) {
        match self.state.try_lock() {
            Ok(mut state) => {
                let parked = self.pending_frames.swap(0, Ordering::AcqRel);
                advance(&mut state, parked.saturating_add(frame_delta));
            }
            Err(TryLockError::WouldBlock) => {
                self.pending_frames.fetch_add(frame_delta, Ordering::AcqRel);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                let mut state = poisoned.into_inner();
                let parked = self.pending_frames.swap(0, Ordering::AcqRel);
                advance(&mut state, parked.saturating_add(frame_delta));
            }
        }
    }

    /// Frames waiting to be applied (diagnostics)
    pub fn pending_frames(&self) -> u64 {
        self.pending_frames.load(Ordering::Acquire)
    }

    /// Lock from the UI side, first applying frames the audio thread parked
    ///
    /// Frames parked before this call are applied ahead of the caller's
    /// mutation. A tick whose `try_lock` failed but whose frames land after
    /// the swap is applied by the next tick or lock instead, after the
    /// mutation; nothing is lost, only ordered later.
    fn lock(&self) -> MutexGuard<'_, TransportState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let parked = self.pending_frames.swap(0, Ordering::AcqRel);
        if parked > 0 {
            advance(&mut state, parked);
        }
        state
    }
}
