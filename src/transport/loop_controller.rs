// LoopController - Per-tick position update on the audio callback
//
// SACRED ZONE: everything reachable from `advance` runs on the real-time
// thread. No allocation, no logging, no blocking, no panics.

use std::sync::Arc;

use crate::clock::TickSink;
use crate::section::LoopRegion;
use crate::transport::shared::SharedTransport;
use crate::transport::state::TransportState;

/// Audio-side handle that turns clock ticks into transport updates
#[derive(Clone)]
pub struct LoopController {
    transport: Arc<SharedTransport>,
}

impl LoopController {
    pub fn new(transport: Arc<SharedTransport>) -> Self {
        Self { transport }
    }

    /// Advance the transport by `frame_delta` song frames
    pub fn on_tick(&self, frame_delta: u64) {
        self.transport.tick(frame_delta);
    }

    pub fn transport(&self) -> &Arc<SharedTransport> {
        &self.transport
    }
}

impl TickSink for LoopController {
    fn on_tick(&self, frame_delta: u64) {
        LoopController::on_tick(self, frame_delta);
    }
}

/// Apply one clock tick to the transport state
///
/// 1. A pending countdown consumes speed-scaled frames first; frames left
///    over once it hits zero move the playhead in the same tick.
/// 2. The playhead advances by `delta * speed`, rounded to whole frames with
///    the fractional remainder carried to the next tick.
/// 3. Passing the active section's end wraps back to its start when both
///    the transport and the section have looping on, carrying the overshoot, and re-arms count-in plus loop delay.
/// 4. Reaching the song end stops playback there.
pub fn advance(state: &mut TransportState, frame_delta: u64) {
    if !state.is_playing || frame_delta == 0 {
        return;
    }

    let scaled = frame_delta as f64 * state.speed + state.frame_carry;
    let whole = scaled.round().max(0.0);
    state.frame_carry = scaled - whole;
    let frames = consume_countdown(state, whole as u64);
    if frames == 0 {
        return;
    }

    state.position = state.position.saturating_add(frames);

    if let Some(region) = state.active {
        if state.loop_enabled
            && region.loop_enabled
            && region.end_frame > region.start_frame
            && state.position >= region.end_frame
        {
            wrap(state, region);
        }
    }

    if state.position >= state.song_length {
        state.position = state.song_length;
        state.is_playing = false;
        state.count_in_remaining = None;
        state.frame_carry = 0.0;
    }
}

/// Take frames from a pending countdown; returns the frames left to play
fn consume_countdown(state: &mut TransportState, frames: u64) -> u64 {
    match state.count_in_remaining {
        Some(remaining) if remaining > 0 => {
            let consumed = remaining.min(frames);
            state.count_in_remaining = Some(remaining - consumed);
            frames - consumed
        }
        _ => frames,
    }
}

fn wrap(state: &mut TransportState, region: LoopRegion) {
    let overshoot = (state.position - region.end_frame) % region.len_frames();
    let countdown = region.count_in_frames.saturating_add(state.loop_delay_frames);

    if countdown > 0 {
        let consumed = overshoot.min(countdown);
        state.count_in_remaining = Some(countdown - consumed);
        state.position = region.start_frame + (overshoot - consumed);
    } else {
        state.position = region.start_frame + overshoot;
    }
}
