// Lock-free channels between device callbacks and the UI context

use crate::midi::event::MidiEvent;
use ringbuf::{HeapRb, traits::Split};

/// Default capacity of the MIDI event channel
pub const MIDI_CHANNEL_CAPACITY: usize = 256;

pub type MidiEventProducer = ringbuf::HeapProd<MidiEvent>;
pub type MidiEventConsumer = ringbuf::HeapCons<MidiEvent>;

pub fn create_midi_channel(capacity: usize) -> (MidiEventProducer, MidiEventConsumer) {
    let rb = HeapRb::<MidiEvent>::new(capacity);
    rb.split()
}
