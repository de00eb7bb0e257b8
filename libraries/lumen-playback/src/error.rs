//! Error types for playback management

use crate::types::TrackId;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// The active slot must name the current track
    #[error("Active slot {slot} does not match current track {current:?}")]
    SlotMismatch {
        slot: TrackId,
        current: Option<TrackId>,
    },

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Native media handle error
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors reported by the native media handle
///
/// Mirrors the failure classes a browser media element reports, so the
/// browser backend can map `DOMException` names one to one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// A newer load/pause interrupted a pending `play()` ("AbortError")
    #[error("Play request superseded by a newer operation")]
    Superseded,

    /// Autoplay policy refused playback ("NotAllowedError")
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    /// Source could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Source could not be fetched
    #[error("Network error: {0}")]
    Network(String),

    /// Source format is not supported ("NotSupportedError")
    #[error("Unsupported source: {0}")]
    Unsupported(String),

    /// Operation not valid in the handle's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Anything the backend could not classify
    #[error("Media error: {0}")]
    Other(String),
}

impl MediaError {
    /// Benign supersession noise that is never surfaced to the user
    pub fn is_superseded(&self) -> bool {
        matches!(self, MediaError::Superseded)
    }
}

/// Failures while re-applying a snapshot after navigation
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Playback moved on while the transition was settling
    #[error("Snapshot for {expected} is stale, current track is {actual:?}")]
    Superseded {
        expected: TrackId,
        actual: Option<TrackId>,
    },

    /// Play state changed while the transition was settling
    #[error("Play state changed during transition")]
    PlayStateChanged,

    /// The native handle rejected the restore
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
