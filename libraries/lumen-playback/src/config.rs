//! Playback configuration
//!
//! Defaults cover the browser case. Values can be layered from an optional
//! TOML file and `LUMEN_*` environment variables, e.g.
//! `LUMEN_TRACK_SETTLE_MS=200`.

use crate::error::{PlaybackError, Result};
use crate::navigation::GuardTimings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the player
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.8)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Delay between re-pointing the source and calling play (default: 150 ms)
    #[serde(default = "default_track_settle_ms")]
    pub track_settle_ms: u64,

    /// Delay before a navigation snapshot is re-applied (default: 100 ms)
    #[serde(default = "default_transition_settle_ms")]
    pub transition_settle_ms: u64,

    /// How long the navigation lock stays armed (default: 500 ms)
    #[serde(default = "default_navigation_lock_ms")]
    pub navigation_lock_ms: u64,

    /// How long a handled `from -> to` pair is remembered (default: 1000 ms)
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        // Override with environment variables (prefixed with LUMEN_)
        settings = settings.add_source(config::Environment::with_prefix("LUMEN").try_parsing(true));

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::Config(format!(
                "initial_volume must be within 0.0..=1.0, got {}",
                self.initial_volume
            )));
        }
        if self.navigation_lock_ms < self.transition_settle_ms {
            return Err(PlaybackError::Config(format!(
                "navigation_lock_ms ({}) must cover transition_settle_ms ({})",
                self.navigation_lock_ms, self.transition_settle_ms
            )));
        }
        Ok(())
    }

    pub fn track_settle(&self) -> Duration {
        Duration::from_millis(self.track_settle_ms)
    }

    pub fn transition_settle(&self) -> Duration {
        Duration::from_millis(self.transition_settle_ms)
    }

    pub fn guard_timings(&self) -> GuardTimings {
        GuardTimings {
            lock: Duration::from_millis(self.navigation_lock_ms),
            dedup_window: Duration::from_millis(self.dedup_window_ms),
        }
    }
}

// Default values
fn default_initial_volume() -> f32 {
    0.8
}

fn default_track_settle_ms() -> u64 {
    150
}

fn default_transition_settle_ms() -> u64 {
    100
}

fn default_navigation_lock_ms() -> u64 {
    500
}

fn default_dedup_window_ms() -> u64 {
    1000
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: default_initial_volume(),
            track_settle_ms: default_track_settle_ms(),
            transition_settle_ms: default_transition_settle_ms(),
            navigation_lock_ms: default_navigation_lock_ms(),
            dedup_window_ms: default_dedup_window_ms(),
        }
    }
}
