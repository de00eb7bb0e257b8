//! Core types for playback management

use crate::queue::UserQueue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Playable unit of audio
///
/// Tracks are never edited once handed to the player; a changed track is a
/// new value that replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Artwork URL (optional)
    pub artwork_url: Option<String>,

    /// URL the media handle is pointed at
    pub media_url: String,

    /// Group/album identity used for content gating (optional)
    pub group_id: Option<String>,
}

impl Track {
    /// Create a track with minimal metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            artist: String::new(),
            artwork_url: None,
            media_url: media_url.into(),
            group_id: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

/// Skip direction for queue resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

/// Process-wide playback state
///
/// Owned by [`PlaybackStore`](crate::store::PlaybackStore); everything else
/// sees clones or borrowed read views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Track the media handle is pointed at
    pub current_track: Option<Track>,

    /// Whether playback is requested
    pub is_playing: bool,

    /// Mute flag (volume level is preserved while muted)
    pub is_muted: bool,

    /// Linear volume in `0.0..=1.0`
    pub volume: f32,

    /// Duration of the current source in seconds
    pub duration: f64,

    /// Playback position in seconds, always within `0..=duration`
    pub current_time: f64,

    /// Visual instance that owns playback; equals the current track id when set
    pub active_slot_id: Option<TrackId>,

    /// Whether the floating player is shown
    pub floating_player_visible: bool,

    /// Context-supplied track list (album, feed, ...)
    pub ambient_track_list: Vec<Track>,

    /// User-curated queue, free of duplicate identities
    pub user_queue: UserQueue,

    /// Current track requires an external gating action before playback
    pub content_locked: bool,
}

impl PlaybackState {
    /// Fresh state with the given initial volume
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            is_muted: false,
            volume: clamp_volume(volume).unwrap_or(1.0),
            duration: 0.0,
            current_time: 0.0,
            active_slot_id: None,
            floating_player_visible: false,
            ambient_track_list: Vec::new(),
            user_queue: UserQueue::new(),
            content_locked: false,
        }
    }

    /// Identity of the current track
    pub fn current_track_id(&self) -> Option<&TrackId> {
        self.current_track.as_ref().map(|t| &t.id)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Clamp a requested volume into `0.0..=1.0`; `None` for NaN/infinite input
pub(crate) fn clamp_volume(volume: f32) -> Option<f32> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

/// Sanitize a time value in seconds (negative or non-finite becomes 0)
pub(crate) fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
