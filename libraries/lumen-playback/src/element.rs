//! Native audio handle abstraction
//!
//! Abstracts the one platform media element (an `HTMLAudioElement` in the
//! browser) so the playback core stays platform-agnostic.

use crate::error::MediaError;
use std::future::Future;
use std::pin::Pin;

/// Pending result of [`MediaElement::play`]
///
/// Behaves like the promise a browser returns: the request is issued when
/// `play()` is called, the future only reports how it ended.
pub type PlayRequest = Pin<Box<dyn Future<Output = Result<(), MediaError>>>>;

/// Raw events reported by the native handle
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Source metadata is available (duration in seconds)
    LoadedMetadata { duration: f64 },

    /// Playback position advanced (seconds)
    TimeUpdate { position: f64 },

    /// Source played through to the end
    Ended,

    /// Handle paused (by us or by the platform, e.g. media keys)
    Paused,

    /// Handle started or resumed playing
    Playing,

    /// Loading or playback failed
    Error(MediaError),
}

/// Platform media handle
///
/// Exactly one instance exists per application. It is re-pointed at new
/// sources, never recreated.
pub trait MediaElement {
    /// Point the handle at a new source URL
    fn set_source(&mut self, url: &str);

    /// Drop the current source
    fn clear_source(&mut self);

    /// Start (re)loading the current source
    fn load(&mut self);

    /// Request playback
    fn play(&mut self) -> PlayRequest;

    fn pause(&mut self);

    /// Whether the handle is paused right now
    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position
    ///
    /// # Errors
    /// `MediaError::InvalidState` when no source is loaded.
    fn set_current_time(&mut self, seconds: f64) -> Result<(), MediaError>;

    /// Duration of the current source in seconds (0 when unknown)
    fn duration(&self) -> f64;

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    /// Events queued by the platform since the last call
    ///
    /// Backends that deliver events by other means can keep the default.
    fn drain_events(&mut self) -> Vec<MediaEvent> {
        Vec::new()
    }

    /// Release platform resources; called once at shutdown
    fn release(&mut self) {}
}

/// Creates the media handle on first use
pub type ElementFactory = Box<dyn FnOnce() -> Box<dyn MediaElement>>;
