//! Player - core orchestration
//!
//! Wires the store, its effect boundaries, the audio resource manager, the
//! queue resolver and the navigation guard together, and exposes the
//! command surface presentation components use.
//!
//! Everything runs on one thread. "Concurrency" is the interleaving of the
//! futures returned here with media events and timers, so every continuation
//! re-checks that its target is still current before acting.

use crate::{
    audio::{AudioEvent, AudioResourceManager, PlayOutcome},
    clock::Clock,
    config::PlaybackConfig,
    effects::{StoreEffects, TrackAction},
    element::{ElementFactory, MediaEvent},
    error::{PlaybackError, Result, TransitionError},
    events::PlaybackEvent,
    gate::{ContentGate, OpenGate},
    navigation::{Decision, NavigationGuard, TransitionSnapshot},
    resolver::resolve_from_state,
    store::PlaybackStore,
    types::{sanitize_seconds, Direction, PlaybackState, Track, TrackId},
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Builder for [`Player`]
pub struct PlayerBuilder {
    config: PlaybackConfig,
    factory: ElementFactory,
    clock: Option<Box<dyn Clock>>,
    gate: Option<Box<dyn ContentGate>>,
}

impl PlayerBuilder {
    /// Timer source (defaults to the platform clock)
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Content-gating check (defaults to [`OpenGate`])
    pub fn gate(mut self, gate: impl ContentGate + 'static) -> Self {
        self.gate = Some(Box::new(gate));
        self
    }

    pub fn build(self) -> Result<Player> {
        self.config.validate()?;

        let clock = match self.clock {
            Some(clock) => clock,
            None => default_clock()
                .ok_or_else(|| PlaybackError::Config("no clock available on this target".into()))?,
        };

        let store = PlaybackStore::new(self.config.initial_volume);
        let guard = NavigationGuard::new(self.config.guard_timings());

        Ok(Player {
            inner: Rc::new(Inner {
                clock,
                gate: self.gate.unwrap_or_else(|| Box::new(OpenGate)),
                store,
                audio: RefCell::new(AudioResourceManager::new(self.factory)),
                effects: RefCell::new(StoreEffects::default()),
                guard: RefCell::new(guard),
                pending_events: RefCell::new(Vec::new()),
                generation: Cell::new(0),
                config: self.config,
            }),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_clock() -> Option<Box<dyn Clock>> {
    Some(Box::new(crate::clock::TokioClock::new()))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
fn default_clock() -> Option<Box<dyn Clock>> {
    Some(Box::new(crate::web::BrowserClock::new()))
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm")))]
fn default_clock() -> Option<Box<dyn Clock>> {
    None
}

struct Inner {
    config: PlaybackConfig,
    clock: Box<dyn Clock>,
    gate: Box<dyn ContentGate>,
    store: PlaybackStore,
    audio: RefCell<AudioResourceManager>,
    effects: RefCell<StoreEffects>,
    guard: RefCell<NavigationGuard>,
    pending_events: RefCell<Vec<PlaybackEvent>>,
    // Bumped by every track start; stale settle timers compare against it
    generation: Cell<u64>,
}

/// Application-wide playback service
///
/// Create one at application start and hand clones to whoever needs it;
/// clones share the same store and the same media handle.
#[derive(Clone)]
pub struct Player {
    inner: Rc<Inner>,
}

/// Returns the guard to `Idle` however the transition future ends
struct FinishTransition<'a> {
    guard: &'a RefCell<NavigationGuard>,
}

impl Drop for FinishTransition<'_> {
    fn drop(&mut self) {
        self.guard.borrow_mut().finish();
    }
}

impl Player {
    pub fn builder(config: PlaybackConfig, factory: ElementFactory) -> PlayerBuilder {
        PlayerBuilder {
            config,
            factory,
            clock: None,
            gate: None,
        }
    }

    // ===== Read view =====

    /// Snapshot of the current state
    pub fn state(&self) -> PlaybackState {
        self.inner.store.state()
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.store.subscribe()
    }

    /// Whether the visual instance `slot` owns playback
    pub fn is_active_slot(&self, slot: &TrackId) -> bool {
        self.inner.store.read(|s| s.active_slot_id.as_ref() == Some(slot))
    }

    /// Number of native handles created so far (never more than one)
    pub fn handles_created(&self) -> usize {
        self.inner.audio.borrow().handles_created()
    }

    pub fn is_transitioning(&self) -> bool {
        self.inner.guard.borrow().is_transitioning()
    }

    /// Take all pending events
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut *self.inner.pending_events.borrow_mut())
    }

    // ===== Transport =====

    /// Toggle playback based on the handle's live state
    ///
    /// The live flag is read instead of the store's because the two can
    /// briefly disagree while a play request is in flight.
    pub async fn play_pause(&self) -> Result<()> {
        let playing = self.inner.audio.borrow().is_playing();
        if playing {
            self.inner.audio.borrow_mut().pause();
            self.mark_paused();
            return Ok(());
        }

        let target = self.inner.store.current_track_id().ok_or(PlaybackError::NoTrackLoaded)?;
        self.run_track_effect();

        let request = self.inner.audio.borrow_mut().play();
        match request.await {
            PlayOutcome::Started if self.is_current(Some(&target)) => {
                self.inner.store.set_playing(true);
                self.inner.effects.borrow_mut().play.observe(true);
            }
            outcome => self.settle_play_outcome(Some(&target), outcome),
        }
        Ok(())
    }

    /// Stop playback and rewind the current track
    pub fn stop(&self) {
        self.bump_generation();
        {
            let mut audio = self.inner.audio.borrow_mut();
            audio.pause();
            // Rewind is best-effort; nothing may be loaded
            let _ = audio.seek(0.0);
        }
        self.mark_paused();
        self.inner.store.set_current_time(0.0);
    }

    /// Seek within the current track; never changes play state
    ///
    /// Returns the position actually applied after clamping.
    pub fn seek(&self, time: f64) -> Result<f64> {
        let (has_track, duration) = self
            .inner
            .store
            .read(|s| (s.current_track.is_some(), s.duration));
        if !has_track {
            return Err(PlaybackError::NoTrackLoaded);
        }

        let position = sanitize_seconds(time).min(duration);
        self.inner.audio.borrow_mut().seek(position)?;
        Ok(self.inner.store.set_current_time(position))
    }

    pub fn set_volume(&self, volume: f32) {
        if self.inner.store.set_volume(volume) {
            self.run_volume_effect();
        }
    }

    pub fn set_muted(&self, muted: bool) {
        if self.inner.store.set_muted(muted) {
            self.run_volume_effect();
        }
    }

    pub fn toggle_mute(&self) {
        let muted = self.inner.store.read(|s| s.is_muted);
        self.set_muted(!muted);
    }

    // ===== Track selection =====

    /// Skip forward; `None` when there is nothing to play
    pub async fn next(&self) -> Option<Track> {
        self.advance(Direction::Next).await
    }

    /// Skip backward; `None` when there is nothing to play
    pub async fn prev(&self) -> Option<Track> {
        self.advance(Direction::Previous).await
    }

    /// Play a specific track
    pub async fn select_track(&self, track: Track) {
        self.start_track(track).await;
    }

    // ===== Queue & context =====

    /// Add to the user queue; no-op when already queued
    pub fn enqueue(&self, track: Track) -> bool {
        let added = self.inner.store.enqueue(track);
        if added {
            self.emit_queue_changed();
        }
        added
    }

    /// Remove from the user queue; no-op when absent
    pub fn dequeue(&self, id: &TrackId) -> Option<Track> {
        let removed = self.inner.store.dequeue(id);
        if removed.is_some() {
            self.emit_queue_changed();
        }
        removed
    }

    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<()> {
        self.inner.store.reorder_queue(from, to)?;
        self.emit_queue_changed();
        Ok(())
    }

    pub fn clear_queue(&self) {
        if self.inner.store.clear_queue() {
            self.emit_queue_changed();
        }
    }

    pub fn set_ambient_track_list(&self, tracks: Vec<Track>) {
        self.inner.store.set_ambient_track_list(tracks);
    }

    pub fn set_floating_player_visible(&self, visible: bool) {
        self.inner.store.set_floating_player_visible(visible);
    }

    pub fn set_content_locked(&self, locked: bool) {
        self.inner.store.set_content_locked(locked);
    }

    /// Hand the active slot to a visual instance (must be the current track)
    pub fn set_active_slot(&self, slot: Option<TrackId>) -> Result<()> {
        self.inner.store.set_active_slot(slot).map(|_| ())
    }

    // ===== Media events =====

    /// Feed one raw event from the media handle
    pub async fn handle_media_event(&self, event: MediaEvent) {
        let Some(event) = AudioResourceManager::interpret(event) else {
            return;
        };

        match event {
            AudioEvent::MetadataReady { duration } => {
                self.inner.store.set_duration(duration);
                self.emit(PlaybackEvent::MetadataReady {
                    duration: sanitize_seconds(duration),
                });
            }
            AudioEvent::PositionChanged { time } => {
                self.inner.store.set_current_time(time);
            }
            AudioEvent::PlaybackEnded => {
                let current = self.inner.store.current_track_id();
                if self.inner.audio.borrow().loaded_track() != current.as_ref() {
                    debug!(?current, "Ended event for a replaced source ignored");
                    return;
                }
                if let Some(track_id) = current {
                    debug!(%track_id, "Track ended");
                    self.emit(PlaybackEvent::TrackEnded { track_id });
                }
                self.mark_paused();
                self.advance(Direction::Next).await;
            }
            // Pause/resume caused by navigation is undone by the restore step
            AudioEvent::Paused if !self.is_transitioning() => {
                if !self.inner.audio.borrow().is_playing() {
                    self.mark_paused();
                }
            }
            AudioEvent::Resumed if !self.is_transitioning() => {
                if self.inner.audio.borrow().is_playing() && self.inner.store.set_playing(true) {
                    self.inner.effects.borrow_mut().play.observe(true);
                }
            }
            AudioEvent::Paused | AudioEvent::Resumed => {}
            AudioEvent::PlaybackError(err) => {
                warn!(error = %err, "Media handle reported an error");
                self.mark_paused();
                self.emit(PlaybackEvent::Error {
                    message: err.to_string(),
                });
            }
        }
    }

    /// Process every event queued on the media handle
    pub async fn pump_media_events(&self) {
        let events = self.inner.audio.borrow_mut().drain_media_events();
        for event in events {
            self.handle_media_event(event).await;
        }
    }

    // ===== Navigation =====

    /// Handle one location notification from the host application
    pub async fn on_location_changed(&self, location: &str) {
        let now = self.inner.clock.now();
        let decision = self.inner.guard.borrow_mut().begin(location, now);
        let (from, to) = match decision {
            Decision::Start { from, to } => (from, to),
            Decision::Skip(reason) => {
                debug!(location, ?reason, "Navigation ignored");
                return;
            }
        };

        info!(%from, %to, "Navigation transition started");
        self.emit(PlaybackEvent::TransitionStarted {
            from,
            to: to.clone(),
        });

        let finish = FinishTransition {
            guard: &self.inner.guard,
        };

        let snapshot = self.take_snapshot();
        self.inner.clock.sleep(self.inner.config.transition_settle()).await;

        let restored = match snapshot {
            Some(snapshot) => match self.restore_snapshot(&snapshot).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "Snapshot restore failed, completing transition");
                    false
                }
            },
            None => false,
        };

        drop(finish);
        debug!(%to, restored, "Navigation transition completed");
        self.emit(PlaybackEvent::TransitionCompleted { to, restored });

        // Effects deferred during the transition
        self.commit().await;
    }

    /// Drive the guard from a location provider until it closes
    pub async fn follow_locations(&self, mut locations: watch::Receiver<String>) {
        let initial = locations.borrow_and_update().clone();
        self.on_location_changed(&initial).await;

        while locations.changed().await.is_ok() {
            let location = locations.borrow_and_update().clone();
            self.on_location_changed(&location).await;
        }
        debug!("Location provider closed");
    }

    // ===== Lifecycle =====

    /// Release the media handle; call once at application shutdown
    pub fn shutdown(&self) {
        self.bump_generation();
        self.inner.store.set_current_track(None);
        self.inner.audio.borrow_mut().release();
        info!("Player shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.audio.borrow().is_released()
    }

    // ===== Internal: track advance =====

    async fn advance(&self, direction: Direction) -> Option<Track> {
        let resolution = self.inner.store.read(|s| resolve_from_state(direction, s));

        let Some(resolution) = resolution else {
            info!(?direction, "Nothing to play, stopping");
            self.bump_generation();
            self.inner.audio.borrow_mut().pause();
            self.mark_paused();
            self.emit(PlaybackEvent::QueueExhausted);
            return None;
        };

        debug!(
            ?direction,
            track_id = %resolution.track.id,
            source = ?resolution.from,
            "Resolved track"
        );
        self.start_track(resolution.track.clone()).await;
        Some(resolution.track)
    }

    /// stop -> reassign -> (settle) -> play
    async fn start_track(&self, track: Track) {
        let generation = self.bump_generation();

        self.inner.audio.borrow_mut().pause();
        self.mark_paused();

        let track_id = track.id.clone();
        let (previous_track_id, host_locked) = self
            .inner
            .store
            .read(|s| (s.current_track.as_ref().map(|t| t.id.clone()), s.content_locked));
        // A host-set lock sticks to its track; a new identity re-asks the gate
        let same_track = previous_track_id.as_ref() == Some(&track_id);
        let locked = self.inner.gate.is_locked(&track) || (host_locked && same_track);

        self.inner.store.set_current_track(Some(track));
        if let Err(err) = self.inner.store.set_active_slot(Some(track_id.clone())) {
            warn!(error = %err, "Could not claim active slot");
        }
        self.inner.store.set_content_locked(locked);

        if !same_track {
            self.emit(PlaybackEvent::TrackChanged {
                track_id: track_id.clone(),
                previous_track_id,
            });
        }

        self.commit().await;
        self.inner.clock.sleep(self.inner.config.track_settle()).await;

        if self.inner.generation.get() != generation {
            debug!(%track_id, "Track start superseded");
            return;
        }
        if locked {
            info!(%track_id, "Track is content-locked, staying paused");
            self.emit(PlaybackEvent::ContentLocked { track_id });
            return;
        }

        self.inner.store.set_playing(true);
        self.commit().await;
    }

    // ===== Internal: navigation snapshot =====

    fn take_snapshot(&self) -> Option<TransitionSnapshot> {
        let (live_track, live_time) = {
            let audio = self.inner.audio.borrow();
            (audio.loaded_track().cloned(), audio.current_time())
        };

        self.inner.store.read(|s| {
            let track = s.current_track.as_ref()?;
            let current_time = if live_track.as_ref() == Some(&track.id) {
                sanitize_seconds(live_time)
            } else {
                s.current_time
            };
            Some(TransitionSnapshot {
                track_id: track.id.clone(),
                current_time,
                is_playing: s.is_playing,
                volume: s.volume,
                is_muted: s.is_muted,
            })
        })
    }

    async fn restore_snapshot(&self, snapshot: &TransitionSnapshot) -> std::result::Result<(), TransitionError> {
        let (current, playing) = self
            .inner
            .store
            .read(|s| (s.current_track_id().cloned(), s.is_playing));

        if current.as_ref() != Some(&snapshot.track_id) {
            return Err(TransitionError::Superseded {
                expected: snapshot.track_id.clone(),
                actual: current,
            });
        }
        if playing != snapshot.is_playing {
            return Err(TransitionError::PlayStateChanged);
        }

        {
            let mut audio = self.inner.audio.borrow_mut();
            audio.set_volume(snapshot.volume);
            audio.set_muted(snapshot.is_muted);
            audio.seek(snapshot.current_time)?;
        }
        self.inner.store.set_current_time(snapshot.current_time);

        if !snapshot.is_playing {
            self.inner.audio.borrow_mut().pause();
            return Ok(());
        }

        let request = self.inner.audio.borrow_mut().play();
        match request.await {
            PlayOutcome::Started => {
                self.inner.effects.borrow_mut().play.observe(true);
                Ok(())
            }
            PlayOutcome::Superseded => Ok(()),
            PlayOutcome::Failed(err) => {
                self.mark_paused();
                self.emit(PlaybackEvent::Error {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // ===== Internal: effects =====

    fn effects_suspended(&self) -> bool {
        self.inner.guard.borrow().is_transitioning()
    }

    /// Run all three effect boundaries; deferred while a transition runs
    async fn commit(&self) {
        if self.effects_suspended() {
            debug!("Effects deferred until navigation settles");
            return;
        }
        self.run_track_effect();
        self.run_volume_effect();
        self.run_play_effect().await;
    }

    fn run_track_effect(&self) {
        if self.effects_suspended() {
            return;
        }
        let action = {
            let mut effects = self.inner.effects.borrow_mut();
            self.inner.store.read(|s| effects.track.poll(s))
        };

        match action {
            Some(TrackAction::Load { track, volume, muted }) => {
                self.inner.audio.borrow_mut().load(&track, volume, muted);
                self.inner.effects.borrow_mut().volume.observe(volume, muted);
            }
            Some(TrackAction::Unload) => self.inner.audio.borrow_mut().unload(),
            None => {}
        }
    }

    fn run_volume_effect(&self) {
        if self.effects_suspended() {
            return;
        }
        let deps = {
            let mut effects = self.inner.effects.borrow_mut();
            self.inner.store.read(|s| effects.volume.poll(s))
        };

        if let Some((volume, muted)) = deps {
            let mut audio = self.inner.audio.borrow_mut();
            audio.set_volume(volume);
            audio.set_muted(muted);
        }
    }

    async fn run_play_effect(&self) {
        let action = {
            let mut effects = self.inner.effects.borrow_mut();
            self.inner.store.read(|s| effects.play.poll(s))
        };

        match action {
            Some(true) => {
                let target = self.inner.store.current_track_id();
                let request = self.inner.audio.borrow_mut().play();
                let outcome = request.await;
                self.settle_play_outcome(target.as_ref(), outcome);
            }
            Some(false) => self.inner.audio.borrow_mut().pause(),
            None => {}
        }
    }

    /// Apply the end of a play request to the store
    fn settle_play_outcome(&self, target: Option<&TrackId>, outcome: PlayOutcome) {
        match outcome {
            PlayOutcome::Started | PlayOutcome::Superseded => {}
            PlayOutcome::Failed(err) if !self.is_current(target) => {
                debug!(error = %err, "Ignoring failure of a replaced play request");
            }
            PlayOutcome::Failed(err) => {
                warn!(error = %err, "Playback failed, pausing");
                self.mark_paused();
                self.emit(PlaybackEvent::Error {
                    message: err.to_string(),
                });
            }
        }
    }

    // ===== Internal: helpers =====

    fn is_current(&self, target: Option<&TrackId>) -> bool {
        self.inner.store.read(|s| s.current_track_id() == target)
    }

    /// Record a pause that already happened on the handle
    fn mark_paused(&self) {
        self.inner.store.set_playing(false);
        self.inner.effects.borrow_mut().play.observe(false);
    }

    fn bump_generation(&self) -> u64 {
        let next = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(next);
        next
    }

    fn emit(&self, event: PlaybackEvent) {
        self.inner.pending_events.borrow_mut().push(event);
    }

    fn emit_queue_changed(&self) {
        let length = self.inner.store.read(|s| s.user_queue.len());
        self.emit(PlaybackEvent::QueueChanged { length });
    }
}
