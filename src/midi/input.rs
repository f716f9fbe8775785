// MIDI Input - Receives controller events from a midir port

use crate::messaging::channels::MidiEventProducer;
use crate::midi::event::MidiEvent;
use midir::{MidiInput as MidirInput, MidiInputConnection};
use ringbuf::traits::Producer;
use thiserror::Error;

const CLIENT_NAME: &str = "Practice Transport MIDI Input";

#[derive(Debug, Error)]
pub enum MidiInputError {
    #[error("MIDI init error: {0}")]
    Init(String),

    #[error("MIDI connection failed: {0}")]
    Connect(String),
}

/// Open connection to one MIDI input port
///
/// Parsed events are pushed into the ring buffer from midir's callback
/// thread; the UI context drains the other end.
pub struct MidiInput {
    _connection: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
}

impl MidiInput {
    /// Names of the available input ports
    pub fn list_ports() -> Result<Vec<String>, MidiInputError> {
        let midi_in = MidirInput::new(CLIENT_NAME).map_err(|e| MidiInputError::Init(e.to_string()))?;
        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }

    /// Connect to `preferred` (or the first port when absent or missing)
    ///
    /// Having no port at all is not an error: the transport keeps running
    /// without MIDI control.
    pub fn connect(
        preferred: Option<&str>,
        mut event_tx: MidiEventProducer,
    ) -> Result<Self, MidiInputError> {
        let midi_in = MidirInput::new(CLIENT_NAME).map_err(|e| MidiInputError::Init(e.to_string()))?;

        let ports = midi_in.ports();
        if ports.is_empty() {
            tracing::info!("No MIDI port detected, continuing without MIDI control");
            return Ok(Self {
                _connection: None,
                port_name: None,
            });
        }

        let named = preferred.and_then(|wanted| {
            ports.iter().find(|port| {
                midi_in
                    .port_name(port)
                    .map(|name| name == wanted)
                    .unwrap_or(false)
            })
        });
        if let (Some(wanted), None) = (preferred, named) {
            tracing::warn!("MIDI port '{}' not found, using first available", wanted);
        }
        let Some(port) = named.or_else(|| ports.first()) else {
            return Ok(Self {
                _connection: None,
                port_name: None,
            });
        };
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());

        let connection = midi_in
            .connect(
                port,
                "practice-transport-input",
                move |_timestamp, message, _| {
                    // Runs on midir's thread: parse and hand over, nothing else
                    if let Some(event) = MidiEvent::from_bytes(message) {
                        // Full buffer: drop the event
                        let _ = event_tx.try_push(event);
                    }
                },
                (),
            )
            .map_err(|e| MidiInputError::Connect(e.to_string()))?;

        tracing::info!("MIDI connected: {}", port_name);

        Ok(Self {
            _connection: Some(connection),
            port_name: Some(port_name),
        })
    }

    /// Name of the connected port, if any
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self._connection.is_some()
    }
}
