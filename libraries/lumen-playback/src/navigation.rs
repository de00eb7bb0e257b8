//! Navigation-transition guard
//!
//! Keeps audio continuous while the host application's location changes.
//!
//! ```text
//!        location change, not locked
//!   Idle ───────────────────────────▶ Transitioning
//!    ▲                                   │ snapshot, arm lock,
//!    │                                   │ settle, restore
//!    └────────── finish (always) ────────┘
//! ```
//!
//! Re-entrant notifications are filtered three ways: a transition already in
//! progress, an armed lock, and a short-lived set of recently handled
//! `from -> to` keys (routers tend to bounce between a detail page and the
//! feed, emitting the same pair repeatedly).
//!
//! Times are durations on the player's monotonic [`Clock`](crate::clock::Clock).

use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Playback values captured when a transition starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    /// Track the snapshot belongs to
    pub track_id: TrackId,
    pub current_time: f64,
    pub is_playing: bool,
    pub volume: f32,
    pub is_muted: bool,
}

/// Guard state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Transitioning { from: String, to: String },
}

/// Why a location notification did not start a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// First location seen; recorded only
    Initial,
    /// Same location after normalization
    SameLocation,
    /// A transition is still running after its lock expired
    InProgress,
    /// Inside the lock window of the transition that just started
    Locked,
    /// Same `from -> to` pair handled moments ago
    Duplicate,
}

/// Result of offering a location to the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Start { from: String, to: String },
    Skip(SkipReason),
}

/// Locked-until timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationLock {
    locked_until: Option<Duration>,
}

impl NavigationLock {
    pub fn arm(&mut self, now: Duration, duration: Duration) {
        self.locked_until = Some(now + duration);
    }

    pub fn release(&mut self) {
        self.locked_until = None;
    }

    /// Disarms on its own once the deadline passes
    pub fn is_armed(&self, now: Duration) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}

/// Guard timings
#[derive(Debug, Clone, Copy)]
pub struct GuardTimings {
    pub lock: Duration,
    pub dedup_window: Duration,
}

/// Transition state machine
#[derive(Debug)]
pub struct NavigationGuard {
    state: GuardState,
    location: Option<String>,
    lock: NavigationLock,
    recent: HashMap<(String, String), Duration>,
    timings: GuardTimings,
}

impl NavigationGuard {
    pub fn new(timings: GuardTimings) -> Self {
        Self {
            state: GuardState::Idle,
            location: None,
            lock: NavigationLock::default(),
            recent: HashMap::new(),
            timings,
        }
    }

    /// Offer a new location
    ///
    /// On `Decision::Start` the guard is `Transitioning` with the lock armed;
    /// the caller must call [`finish`](Self::finish) afterwards.
    pub fn begin(&mut self, location: &str, now: Duration) -> Decision {
        let to = normalize_location(location);

        let Some(from) = self.location.clone() else {
            self.location = Some(to);
            return Decision::Skip(SkipReason::Initial);
        };
        if from == to {
            return Decision::Skip(SkipReason::SameLocation);
        }
        // The lock absorbs the notification burst right after a start; the
        // state check catches a transition that outlives the lock
        if self.lock.is_armed(now) {
            return Decision::Skip(SkipReason::Locked);
        }
        if self.is_transitioning() {
            return Decision::Skip(SkipReason::InProgress);
        }

        self.prune(now);
        let key = (from.clone(), to.clone());
        if self.recent.contains_key(&key) {
            self.location = Some(to);
            return Decision::Skip(SkipReason::Duplicate);
        }
        self.recent.insert(key, now);

        self.lock.arm(now, self.timings.lock);
        self.state = GuardState::Transitioning {
            from: from.clone(),
            to: to.clone(),
        };
        Decision::Start { from, to }
    }

    /// Record the destination, release the lock and return to `Idle`
    pub fn finish(&mut self) {
        if let GuardState::Transitioning { to, .. } = std::mem::replace(&mut self.state, GuardState::Idle) {
            self.location = Some(to);
        }
        self.lock.release();
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, GuardState::Transitioning { .. })
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Last recorded location
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_locked(&self, now: Duration) -> bool {
        self.lock.is_armed(now)
    }

    fn prune(&mut self, now: Duration) {
        let window = self.timings.dedup_window;
        self.recent.retain(|_, seen| now.saturating_sub(*seen) < window);
    }
}

/// Strip trailing slashes so `/feed/` and `/feed` compare equal
pub fn normalize_location(location: &str) -> String {
    let trimmed = location.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
