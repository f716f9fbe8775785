pub mod channels;

pub use channels::{
    MIDI_CHANNEL_CAPACITY, MidiEventConsumer, MidiEventProducer, create_midi_channel,
};
