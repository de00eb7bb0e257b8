//! Playback state store
//!
//! The only writer of [`PlaybackState`]. Every mutation goes through a setter
//! here, which keeps the invariants:
//!
//! - `current_time` stays within `0..=duration`
//! - no current track means not playing
//! - `active_slot_id`, when set, names the current track
//! - the user queue holds each track identity at most once
//!
//! Readers get clones, borrowed views, or a `watch` receiver that is notified
//! on every effective change.

use crate::{
    error::{PlaybackError, Result},
    types::{clamp_volume, sanitize_seconds, PlaybackState, Track, TrackId},
};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Single-writer state container
#[derive(Debug)]
pub struct PlaybackStore {
    tx: watch::Sender<PlaybackState>,
}

impl PlaybackStore {
    pub fn new(initial_volume: f32) -> Self {
        let (tx, _rx) = watch::channel(PlaybackState::new(initial_volume));
        Self { tx }
    }

    // ===== Read view =====

    /// Clone of the current state
    pub fn state(&self) -> PlaybackState {
        self.tx.borrow().clone()
    }

    /// Read a projection without cloning the whole state
    pub fn read<R>(&self, f: impl FnOnce(&PlaybackState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified on every effective change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.tx.subscribe()
    }

    pub fn current_track_id(&self) -> Option<TrackId> {
        self.read(|s| s.current_track_id().cloned())
    }

    pub fn is_playing(&self) -> bool {
        self.read(|s| s.is_playing)
    }

    // ===== Setters =====

    /// Replace the current track
    ///
    /// A different track resets position and duration and hands the active
    /// slot to the new track. `None` also stops playback.
    pub fn set_current_track(&self, track: Option<Track>) -> bool {
        self.tx.send_if_modified(|state| {
            let same = state.current_track_id() == track.as_ref().map(|t| &t.id);
            if same && state.current_track == track {
                return false;
            }
            match track {
                Some(track) => {
                    if !same {
                        state.current_time = 0.0;
                        state.duration = 0.0;
                        state.active_slot_id = Some(track.id.clone());
                    }
                    state.current_track = Some(track);
                }
                None => {
                    state.current_track = None;
                    state.is_playing = false;
                    state.current_time = 0.0;
                    state.duration = 0.0;
                    state.active_slot_id = None;
                    state.content_locked = false;
                }
            }
            true
        })
    }

    /// Set the playing flag; ignored (returns `false`) without a current track
    pub fn set_playing(&self, playing: bool) -> bool {
        self.tx.send_if_modified(|state| {
            if playing && state.current_track.is_none() {
                debug!("Play requested without a current track");
                return false;
            }
            if state.is_playing == playing {
                return false;
            }
            state.is_playing = playing;
            true
        })
    }

    pub fn set_muted(&self, muted: bool) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = state.is_muted != muted;
            state.is_muted = muted;
            changed
        })
    }

    /// Set volume, clamped into `0.0..=1.0`; non-finite input is ignored
    pub fn set_volume(&self, volume: f32) -> bool {
        let Some(volume) = clamp_volume(volume) else {
            warn!(volume, "Ignoring non-finite volume");
            return false;
        };
        self.tx.send_if_modified(|state| {
            let changed = state.volume != volume;
            state.volume = volume;
            changed
        })
    }

    /// Set source duration; position is clamped to the new bound
    pub fn set_duration(&self, duration: f64) -> bool {
        let duration = sanitize_seconds(duration);
        self.tx.send_if_modified(|state| {
            let clamped = state.current_time.min(duration);
            let changed = state.duration != duration || state.current_time != clamped;
            state.duration = duration;
            state.current_time = clamped;
            changed
        })
    }

    /// Set playback position, clamped into `0..=duration`
    ///
    /// Returns the stored value.
    pub fn set_current_time(&self, time: f64) -> f64 {
        let mut stored = 0.0;
        self.tx.send_if_modified(|state| {
            stored = sanitize_seconds(time).min(state.duration);
            let changed = state.current_time != stored;
            state.current_time = stored;
            changed
        });
        stored
    }

    /// Hand the active slot to a visual instance
    ///
    /// The slot must name the current track.
    pub fn set_active_slot(&self, slot: Option<TrackId>) -> Result<bool> {
        let mut mismatch = None;
        let changed = self.tx.send_if_modified(|state| {
            if let Some(ref id) = slot {
                if state.current_track_id() != Some(id) {
                    mismatch = Some(PlaybackError::SlotMismatch {
                        slot: id.clone(),
                        current: state.current_track_id().cloned(),
                    });
                    return false;
                }
            }
            let changed = state.active_slot_id != slot;
            state.active_slot_id = slot;
            changed
        });
        match mismatch {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    pub fn set_floating_player_visible(&self, visible: bool) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = state.floating_player_visible != visible;
            state.floating_player_visible = visible;
            changed
        })
    }

    /// Replace the ambient (context-supplied) track list
    pub fn set_ambient_track_list(&self, tracks: Vec<Track>) -> bool {
        self.tx.send_if_modified(|state| {
            if state.ambient_track_list == tracks {
                return false;
            }
            state.ambient_track_list = tracks;
            true
        })
    }

    pub fn set_content_locked(&self, locked: bool) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = state.content_locked != locked;
            state.content_locked = locked;
            changed
        })
    }

    // ===== User queue =====

    /// Append to the user queue; no-op for an identity already queued
    pub fn enqueue(&self, track: Track) -> bool {
        self.tx.send_if_modified(|state| state.user_queue.enqueue(track))
    }

    /// Remove from the user queue; no-op for an absent identity
    pub fn dequeue(&self, id: &TrackId) -> Option<Track> {
        let mut removed = None;
        self.tx.send_if_modified(|state| {
            removed = state.user_queue.dequeue(id);
            removed.is_some()
        });
        removed
    }

    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<()> {
        let mut result = Ok(());
        self.tx.send_if_modified(|state| match state.user_queue.reorder(from, to) {
            Ok(()) => from != to,
            Err(index) => {
                result = Err(PlaybackError::IndexOutOfBounds(index));
                false
            }
        });
        result
    }

    pub fn clear_queue(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.user_queue.is_empty() {
                return false;
            }
            state.user_queue.clear();
            true
        })
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Track {id}"), format!("https://cdn.test/{id}.mp3"))
    }

    #[test]
    fn cannot_play_without_track() {
        let store = PlaybackStore::default();
        assert!(!store.set_playing(true));
        assert!(!store.is_playing());
    }

    #[test]
    fn clearing_track_stops_playback() {
        let store = PlaybackStore::default();
        store.set_current_track(Some(track("a")));
        store.set_playing(true);

        store.set_current_track(None);

        let state = store.state();
        assert!(!state.is_playing);
        assert!(state.active_slot_id.is_none());
    }

    #[test]
    fn new_track_claims_active_slot_and_resets_position() {
        let store = PlaybackStore::default();
        store.set_current_track(Some(track("a")));
        store.set_duration(200.0);
        store.set_current_time(50.0);

        store.set_current_track(Some(track("b")));

        let state = store.state();
        assert_eq!(state.active_slot_id, Some(TrackId::new("b")));
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
    }

    #[test]
    fn current_time_is_clamped_to_duration() {
        let store = PlaybackStore::default();
        store.set_current_track(Some(track("a")));
        store.set_duration(100.0);

        assert_eq!(store.set_current_time(150.0), 100.0);
        assert_eq!(store.set_current_time(-3.0), 0.0);
        assert_eq!(store.set_current_time(42.0), 42.0);

        store.set_duration(30.0);
        assert_eq!(store.state().current_time, 30.0);
    }

    #[test]
    fn volume_is_clamped() {
        let store = PlaybackStore::default();
        store.set_volume(1.7);
        assert_eq!(store.state().volume, 1.0);

        store.set_volume(-0.5);
        assert_eq!(store.state().volume, 0.0);

        assert!(!store.set_volume(f32::NAN));
        assert_eq!(store.state().volume, 0.0);
    }

    #[test]
    fn active_slot_must_match_current_track() {
        let store = PlaybackStore::default();
        store.set_current_track(Some(track("a")));

        let err = store.set_active_slot(Some(TrackId::new("b"))).unwrap_err();
        assert!(matches!(err, PlaybackError::SlotMismatch { .. }));
        assert_eq!(store.state().active_slot_id, Some(TrackId::new("a")));

        assert!(store.set_active_slot(None).unwrap());
        assert!(store.set_active_slot(Some(TrackId::new("a"))).unwrap());
    }

    #[test]
    fn queue_rejects_duplicates() {
        let store = PlaybackStore::default();
        assert!(store.enqueue(track("a")));
        assert!(!store.enqueue(track("a")));
        assert_eq!(store.state().user_queue.len(), 1);

        assert!(store.dequeue(&TrackId::new("zzz")).is_none());
        assert!(store.dequeue(&TrackId::new("a")).is_some());
        assert!(store.state().user_queue.is_empty());
    }

    #[test]
    fn reorder_out_of_bounds_reports_index() {
        let store = PlaybackStore::default();
        store.enqueue(track("a"));

        let err = store.reorder_queue(0, 4).unwrap_err();
        assert!(matches!(err, PlaybackError::IndexOutOfBounds(4)));
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = PlaybackStore::default();
        let mut rx = store.subscribe();

        store.set_floating_player_visible(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().floating_player_visible);

        // No-op writes do not notify
        store.set_floating_player_visible(true);
        assert!(!rx.has_changed().unwrap());
    }
}
