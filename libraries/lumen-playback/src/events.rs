//! Playback Events
//!
//! Notifications for presentation components. State itself is observed
//! through the store subscription; these cover the moments a widget may
//! want to react to (a track ended, content is locked, an error happened).

use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Current track replaced
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Source metadata loaded
    MetadataReady {
        /// Duration in seconds
        duration: f64,
    },

    /// Track finished playing naturally (reached end)
    TrackEnded {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Resolved track needs unlocking; playback stays paused
    ContentLocked {
        /// ID of the locked track
        track_id: TrackId,
    },

    /// Queue and ambient list are both empty; playback stopped
    QueueExhausted,

    /// User queue changed (tracks added/removed/reordered)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Navigation transition began
    TransitionStarted { from: String, to: String },

    /// Navigation transition finished
    TransitionCompleted {
        to: String,
        /// Whether a snapshot was re-applied to the media handle
        restored: bool,
    },

    /// Non-fatal error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_tag() {
        let event = PlaybackEvent::TrackEnded {
            track_id: TrackId::new("a"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"TrackEnded":{"track_id":"a"}}"#);
    }
}
