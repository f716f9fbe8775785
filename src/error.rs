// Error types shared by the transport, the section store and the command layer

use crate::section::SectionId;

/// Errors produced when a mutation request is rejected
///
/// Every error leaves the prior state untouched: validation always happens
/// before the first field is written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Section bounds violate `0 <= start < end <= song_length`
    #[error("Invalid range: [{start}, {end}) does not fit in a song of {song_length} frames")]
    InvalidRange {
        start: u64,
        end: u64,
        song_length: u64,
    },

    /// A parameter is outside its accepted domain (speed, name, delta...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A section id that does not exist (or no longer exists)
    #[error("Section {0} not found")]
    NotFound(SectionId),
}

/// Result type for command operations
pub type CommandResult<T> = Result<T, TransportError>;
