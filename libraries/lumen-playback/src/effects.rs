//! Store effect boundaries
//!
//! Three independent reactions to store changes, each keyed on its own
//! dependencies:
//!
//! - track: `current_track` identity -> re-point the media handle
//! - play state: `is_playing` -> play / pause
//! - volume: `(volume, is_muted)` -> push to the handle
//!
//! An effect fires only when its own dependencies differ from what it last
//! applied. A volume change can therefore never reach the play/pause path.

use crate::types::{PlaybackState, Track, TrackId};

/// What the track effect wants done
#[derive(Debug, Clone, PartialEq)]
pub enum TrackAction {
    /// Re-point the handle, keeping volume/mute
    Load {
        track: Track,
        volume: f32,
        muted: bool,
    },
    /// Detach the handle's source
    Unload,
}

#[derive(Debug, Default)]
pub struct TrackEffect {
    applied: Option<TrackId>,
}

impl TrackEffect {
    pub fn poll(&mut self, state: &PlaybackState) -> Option<TrackAction> {
        let current = state.current_track_id();
        if current == self.applied.as_ref() {
            return None;
        }
        self.applied = current.cloned();
        Some(match &state.current_track {
            Some(track) => TrackAction::Load {
                track: track.clone(),
                volume: state.volume,
                muted: state.is_muted,
            },
            None => TrackAction::Unload,
        })
    }
}

#[derive(Debug, Default)]
pub struct PlayStateEffect {
    applied: bool,
}

impl PlayStateEffect {
    /// `Some(true)` to play, `Some(false)` to pause
    pub fn poll(&mut self, state: &PlaybackState) -> Option<bool> {
        if state.is_playing == self.applied {
            return None;
        }
        self.applied = state.is_playing;
        Some(state.is_playing)
    }

    /// Record a play state that was applied to the handle directly
    pub fn observe(&mut self, playing: bool) {
        self.applied = playing;
    }
}

#[derive(Debug, Default)]
pub struct VolumeEffect {
    applied: Option<(f32, bool)>,
}

impl VolumeEffect {
    pub fn poll(&mut self, state: &PlaybackState) -> Option<(f32, bool)> {
        let deps = (state.volume, state.is_muted);
        if self.applied == Some(deps) {
            return None;
        }
        self.applied = Some(deps);
        Some(deps)
    }

    /// Record volume/mute that were applied to the handle directly
    pub fn observe(&mut self, volume: f32, muted: bool) {
        self.applied = Some((volume, muted));
    }
}

/// The three boundaries attached to the store
#[derive(Debug, Default)]
pub struct StoreEffects {
    pub track: TrackEffect,
    pub play: PlayStateEffect,
    pub volume: VolumeEffect,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_track(id: &str) -> PlaybackState {
        let mut state = PlaybackState::new(0.5);
        state.current_track = Some(Track::new(id, id, format!("https://cdn.test/{id}.mp3")));
        state
    }

    #[test]
    fn track_effect_fires_once_per_identity() {
        let mut effect = TrackEffect::default();
        let state = state_with_track("a");

        assert!(matches!(effect.poll(&state), Some(TrackAction::Load { .. })));
        assert_eq!(effect.poll(&state), None);

        let cleared = PlaybackState::new(0.5);
        assert_eq!(effect.poll(&cleared), Some(TrackAction::Unload));
    }

    #[test]
    fn track_load_carries_current_volume() {
        let mut effect = TrackEffect::default();
        let mut state = state_with_track("a");
        state.volume = 0.3;
        state.is_muted = true;

        match effect.poll(&state) {
            Some(TrackAction::Load { volume, muted, .. }) => {
                assert_eq!(volume, 0.3);
                assert!(muted);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn volume_changes_leave_play_effect_idle() {
        let mut effects = StoreEffects::default();
        let mut state = state_with_track("a");
        state.is_playing = true;

        effects.track.poll(&state);
        effects.volume.poll(&state);
        assert_eq!(effects.play.poll(&state), Some(true));

        for volume in [0.1, 0.9, 0.4] {
            state.volume = volume;
            state.is_muted = !state.is_muted;
            assert!(effects.volume.poll(&state).is_some());
            assert_eq!(effects.play.poll(&state), None);
            assert_eq!(effects.track.poll(&state), None);
        }
    }

    #[test]
    fn observed_play_state_is_not_reapplied() {
        let mut effect = PlayStateEffect::default();
        let mut state = state_with_track("a");
        state.is_playing = true;

        effect.observe(true);
        assert_eq!(effect.poll(&state), None);

        state.is_playing = false;
        assert_eq!(effect.poll(&state), Some(false));
    }
}
