//! Lumen - Playback Engine Core
//!
//! Single-resource audio playback for a web application whose UI is torn
//! down and rebuilt on every navigation.
//!
//! This crate provides:
//! - One native media handle for the whole application lifetime
//! - A process-wide playback store with independent effect boundaries
//!   (track, play state, volume)
//! - Two-tier queue resolution (user queue first, then the ambient list)
//! - A navigation guard that keeps audio continuous across route changes
//! - A control façade for play/pause, seek, skip, selection and queue edits
//!
//! # Architecture
//!
//! `lumen-playback` is platform-agnostic. The native handle is reached
//! through the [`MediaElement`] trait and timers through [`Clock`]; the
//! `wasm` feature adds an `HTMLAudioElement` backend and JavaScript bindings.
//!
//! Everything is single-threaded: the [`Player`] is a cheap `Rc` handle and
//! its async operations are local futures.
//!
//! # Example
//!
//! ```rust,no_run
//! use lumen_playback::{MediaElement, MediaError, PlaybackConfig, Player, Track};
//! # use lumen_playback::element::PlayRequest;
//! # struct Silent;
//! # impl MediaElement for Silent {
//! #     fn set_source(&mut self, _: &str) {}
//! #     fn clear_source(&mut self) {}
//! #     fn load(&mut self) {}
//! #     fn play(&mut self) -> PlayRequest { Box::pin(async { Ok(()) }) }
//! #     fn pause(&mut self) {}
//! #     fn is_paused(&self) -> bool { true }
//! #     fn current_time(&self) -> f64 { 0.0 }
//! #     fn set_current_time(&mut self, _: f64) -> Result<(), MediaError> { Ok(()) }
//! #     fn duration(&self) -> f64 { 0.0 }
//! #     fn set_volume(&mut self, _: f32) {}
//! #     fn set_muted(&mut self, _: bool) {}
//! # }
//! # async fn run() -> lumen_playback::Result<()> {
//! let player = Player::builder(
//!     PlaybackConfig::default(),
//!     Box::new(|| Box::new(Silent) as Box<dyn MediaElement>),
//! )
//! .build()?;
//!
//! player.set_ambient_track_list(vec![
//!     Track::new("a", "Intro", "https://cdn.example/a.mp3"),
//!     Track::new("b", "Outro", "https://cdn.example/b.mp3"),
//! ]);
//!
//! player.next().await;
//! player.set_volume(0.4);
//! player.on_location_changed("/track/a").await;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod clock;
pub mod config;
pub mod effects;
pub mod element;
pub mod error;
pub mod events;
pub mod gate;
pub mod navigation;
pub mod player;
pub mod queue;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(feature = "wasm")]
pub mod web;

pub use audio::{AudioEvent, AudioResourceManager, PlayOutcome};
pub use clock::Clock;
#[cfg(not(target_arch = "wasm32"))]
pub use clock::TokioClock;
pub use config::PlaybackConfig;
pub use element::{ElementFactory, MediaElement, MediaEvent};
pub use error::{MediaError, PlaybackError, Result, TransitionError};
pub use events::PlaybackEvent;
pub use gate::{ContentGate, LockedGroups, OpenGate};
pub use navigation::{Decision, GuardState, NavigationGuard, SkipReason, TransitionSnapshot};
pub use player::{Player, PlayerBuilder};
pub use queue::UserQueue;
pub use resolver::{resolve, ResolvedFrom, Resolution};
pub use store::PlaybackStore;
pub use types::{Direction, PlaybackState, Track, TrackId};
