//! Error types for the I/O boundaries (audio, storage, zone catalog)
//!
//! None of these reach the simulation: the audio manager and the save slot
//! absorb them and degrade, so the frame loop never observes a failure.

use thiserror::Error;

/// Errors from decoding tracks or talking to an audio device
#[derive(Error, Debug)]
pub enum AudioError {
    /// Track file could not be read
    #[error("Failed to read track '{path}': {reason}")]
    Read { path: String, reason: String },

    /// Track bytes are not a decodable audio stream
    #[error("Failed to decode track: {0}")]
    Decode(String),

    /// Decodable but unusable (zero channels, empty, ...)
    #[error("Unsupported track format: {0}")]
    Unsupported(String),

    /// The output device/context is missing or refused an operation
    #[error("Audio output error: {0}")]
    Output(String),

    /// Context resume did not finish in time
    #[error("Audio context resume timed out after {0} ms")]
    Timeout(u64),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::Decode(err.to_string())
    }
}

/// Errors from the key-value store behind saves and settings
#[derive(Error, Debug)]
pub enum StorageError {
    /// No storage backend available (private browsing, no home dir, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Stored value did not (de)serialize
    #[error("Invalid stored value: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors from loading a zone catalog document
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Zone catalog is empty")]
    Empty,

    #[error("Zone {0} has no obstacle templates")]
    NoTemplates(u32),

    #[error("Duplicate zone id {0}")]
    DuplicateId(u32),

    #[error("Zone {id} has a non-positive {field}")]
    NonPositive { id: u32, field: &'static str },
}
