//! Audio resource manager
//!
//! Owns the single native media handle for the whole application lifetime.
//! Tracks change by re-pointing the handle's source; the handle itself is
//! created once (lazily) and only released at shutdown.
//!
//! The manager mirrors a projection of the playback state (source, volume,
//! mute, position). It is not a second source of truth.

use crate::{
    element::{ElementFactory, MediaElement, MediaEvent},
    error::MediaError,
    types::{Track, TrackId},
};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// How a play request ended
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// Handle is playing
    Started,

    /// A newer operation replaced the request; expected noise
    Superseded,

    /// Playback failed; caller must drop back to paused
    Failed(MediaError),
}

/// Future resolving to a [`PlayOutcome`]
pub type PlayFuture = Pin<Box<dyn Future<Output = PlayOutcome>>>;

/// Manager-level events derived from raw handle events
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    MetadataReady { duration: f64 },
    PositionChanged { time: f64 },
    PlaybackEnded,
    Paused,
    Resumed,
    PlaybackError(MediaError),
}

/// Single-handle audio manager
pub struct AudioResourceManager {
    factory: Option<ElementFactory>,
    element: Option<Box<dyn MediaElement>>,
    handles_created: usize,
    loaded: Option<TrackId>,
    released: bool,
}

impl AudioResourceManager {
    /// Create manager; the handle is built on first use
    pub fn new(factory: ElementFactory) -> Self {
        Self {
            factory: Some(factory),
            element: None,
            handles_created: 0,
            loaded: None,
            released: false,
        }
    }

    /// Get the handle, creating it the first time
    fn element(&mut self) -> Option<&mut (dyn MediaElement + 'static)> {
        if self.element.is_none() && !self.released {
            if let Some(factory) = self.factory.take() {
                debug!("Creating native media handle");
                self.element = Some(factory());
                self.handles_created += 1;
            }
        }
        self.element.as_deref_mut()
    }

    /// Point the handle at `track`, preserving volume and mute exactly
    pub fn load(&mut self, track: &Track, volume: f32, muted: bool) {
        let Some(element) = self.element() else {
            warn!(track_id = %track.id, "Load after shutdown ignored");
            return;
        };
        let stale = element.drain_events().len();
        if stale > 0 {
            debug!(stale, "Dropped events from the previous source");
        }
        element.set_source(&track.media_url);
        element.load();
        element.set_volume(volume);
        element.set_muted(muted);
        debug!(track_id = %track.id, url = %track.media_url, "Source re-pointed");
        self.loaded = Some(track.id.clone());
    }

    /// Detach the current source
    pub fn unload(&mut self) {
        if let Some(element) = self.element() {
            element.pause();
            element.clear_source();
        }
        self.loaded = None;
    }

    /// Request playback
    ///
    /// Supersession rejections are folded into [`PlayOutcome::Superseded`].
    pub fn play(&mut self) -> PlayFuture {
        if self.loaded.is_none() {
            return Box::pin(async { PlayOutcome::Failed(MediaError::InvalidState("no source loaded".into())) });
        }
        let Some(element) = self.element() else {
            return Box::pin(async { PlayOutcome::Failed(MediaError::InvalidState("handle released".into())) });
        };
        let request = element.play();

        Box::pin(async move {
            match request.await {
                Ok(()) => PlayOutcome::Started,
                Err(err) if err.is_superseded() => {
                    debug!("Play request superseded");
                    PlayOutcome::Superseded
                }
                Err(err) => {
                    warn!(error = %err, "Play request rejected");
                    PlayOutcome::Failed(err)
                }
            }
        })
    }

    pub fn pause(&mut self) {
        if let Some(element) = self.element.as_deref_mut() {
            element.pause();
        }
    }

    /// Move the playback position
    pub fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        match self.element.as_deref_mut() {
            Some(element) if self.loaded.is_some() => element.set_current_time(seconds),
            _ => Err(MediaError::InvalidState("no source loaded".into())),
        }
    }

    /// Apply volume directly; never touches play state
    ///
    /// Without a handle yet this is a no-op; `load` applies the values.
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(element) = self.element.as_deref_mut() {
            element.set_volume(volume);
        }
    }

    /// Apply mute directly; never touches play state
    pub fn set_muted(&mut self, muted: bool) {
        if let Some(element) = self.element.as_deref_mut() {
            element.set_muted(muted);
        }
    }

    /// Live playing flag of the handle
    pub fn is_playing(&self) -> bool {
        self.element.as_deref().is_some_and(|e| !e.is_paused())
    }

    /// Live position of the handle
    pub fn current_time(&self) -> f64 {
        self.element.as_deref().map_or(0.0, |e| e.current_time())
    }

    /// Track the handle currently points at
    pub fn loaded_track(&self) -> Option<&TrackId> {
        self.loaded.as_ref()
    }

    /// Number of native handles ever created (0 or 1)
    pub fn handles_created(&self) -> usize {
        self.handles_created
    }

    /// Events queued on the native handle
    pub fn drain_media_events(&mut self) -> Vec<MediaEvent> {
        self.element
            .as_deref_mut()
            .map(|e| e.drain_events())
            .unwrap_or_default()
    }

    /// Translate a raw handle event
    ///
    /// Superseded errors are dropped here.
    pub fn interpret(event: MediaEvent) -> Option<AudioEvent> {
        match event {
            MediaEvent::LoadedMetadata { duration } => Some(AudioEvent::MetadataReady { duration }),
            MediaEvent::TimeUpdate { position } => Some(AudioEvent::PositionChanged { time: position }),
            MediaEvent::Ended => Some(AudioEvent::PlaybackEnded),
            MediaEvent::Paused => Some(AudioEvent::Paused),
            MediaEvent::Playing => Some(AudioEvent::Resumed),
            MediaEvent::Error(err) if err.is_superseded() => None,
            MediaEvent::Error(err) => Some(AudioEvent::PlaybackError(err)),
        }
    }

    /// Release the native handle (application shutdown)
    pub fn release(&mut self) {
        if let Some(mut element) = self.element.take() {
            element.pause();
            element.release();
            debug!("Native media handle released");
        }
        self.factory = None;
        self.loaded = None;
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PlayRequest;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        source: Option<String>,
        paused: bool,
        volume: f32,
        muted: bool,
        position: f64,
        play_calls: usize,
        released: bool,
        reject_with: Option<MediaError>,
        queued: Vec<MediaEvent>,
    }

    struct StubElement(Rc<RefCell<Probe>>);

    impl MediaElement for StubElement {
        fn set_source(&mut self, url: &str) {
            self.0.borrow_mut().source = Some(url.to_string());
        }
        fn clear_source(&mut self) {
            self.0.borrow_mut().source = None;
        }
        fn load(&mut self) {
            self.0.borrow_mut().position = 0.0;
        }
        fn play(&mut self) -> PlayRequest {
            let mut probe = self.0.borrow_mut();
            probe.play_calls += 1;
            let result = match probe.reject_with.clone() {
                Some(err) => Err(err),
                None => {
                    probe.paused = false;
                    Ok(())
                }
            };
            Box::pin(async move { result })
        }
        fn pause(&mut self) {
            self.0.borrow_mut().paused = true;
        }
        fn is_paused(&self) -> bool {
            self.0.borrow().paused
        }
        fn current_time(&self) -> f64 {
            self.0.borrow().position
        }
        fn set_current_time(&mut self, seconds: f64) -> Result<(), MediaError> {
            self.0.borrow_mut().position = seconds;
            Ok(())
        }
        fn duration(&self) -> f64 {
            180.0
        }
        fn set_volume(&mut self, volume: f32) {
            self.0.borrow_mut().volume = volume;
        }
        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().muted = muted;
        }
        fn drain_events(&mut self) -> Vec<MediaEvent> {
            std::mem::take(&mut self.0.borrow_mut().queued)
        }
        fn release(&mut self) {
            self.0.borrow_mut().released = true;
        }
    }

    fn manager() -> (AudioResourceManager, Rc<RefCell<Probe>>) {
        let probe = Rc::new(RefCell::new(Probe {
            paused: true,
            ..Probe::default()
        }));
        let handle = Rc::clone(&probe);
        let manager = AudioResourceManager::new(Box::new(move || {
            Box::new(StubElement(handle)) as Box<dyn MediaElement>
        }));
        (manager, probe)
    }

    fn track(id: &str) -> Track {
        Track::new(id, id, format!("https://cdn.test/{id}.mp3"))
    }

    #[test]
    fn handle_created_once_across_loads() {
        let (mut audio, probe) = manager();
        assert_eq!(audio.handles_created(), 0);

        audio.load(&track("a"), 0.5, false);
        audio.load(&track("b"), 0.5, false);
        audio.load(&track("c"), 0.5, false);

        assert_eq!(audio.handles_created(), 1);
        assert_eq!(probe.borrow().source.as_deref(), Some("https://cdn.test/c.mp3"));
        assert_eq!(audio.loaded_track().map(TrackId::as_str), Some("c"));
    }

    #[test]
    fn load_discards_events_from_previous_source() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 1.0, false);
        probe.borrow_mut().queued.push(MediaEvent::Ended);

        audio.load(&track("b"), 1.0, false);
        assert!(audio.drain_media_events().is_empty());

        probe.borrow_mut().queued.push(MediaEvent::TimeUpdate { position: 1.0 });
        assert_eq!(audio.drain_media_events(), vec![MediaEvent::TimeUpdate { position: 1.0 }]);
    }

    #[test]
    fn volume_before_first_load_creates_nothing() {
        let (mut audio, _probe) = manager();
        audio.set_volume(0.4);
        audio.set_muted(true);
        assert_eq!(audio.handles_created(), 0);
    }

    #[test]
    fn load_preserves_volume_and_mute() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 0.35, true);

        let probe = probe.borrow();
        assert_eq!(probe.volume, 0.35);
        assert!(probe.muted);
    }

    #[test]
    fn volume_does_not_touch_play_state() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 1.0, false);
        probe.borrow_mut().paused = false;

        audio.set_volume(0.2);
        audio.set_muted(true);
        audio.set_muted(false);

        assert!(audio.is_playing());
        assert_eq!(probe.borrow().play_calls, 0);
    }

    #[tokio::test]
    async fn play_without_source_fails() {
        let (mut audio, _probe) = manager();
        let outcome = audio.play().await;
        assert!(matches!(outcome, PlayOutcome::Failed(MediaError::InvalidState(_))));
    }

    #[tokio::test]
    async fn superseded_rejection_is_swallowed() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 1.0, false);
        probe.borrow_mut().reject_with = Some(MediaError::Superseded);

        assert_eq!(audio.play().await, PlayOutcome::Superseded);
    }

    #[tokio::test]
    async fn other_rejection_is_surfaced() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 1.0, false);
        probe.borrow_mut().reject_with = Some(MediaError::NotAllowed("autoplay".into()));

        assert_eq!(
            audio.play().await,
            PlayOutcome::Failed(MediaError::NotAllowed("autoplay".into()))
        );
    }

    #[test]
    fn seek_requires_source() {
        let (mut audio, probe) = manager();
        assert!(audio.seek(10.0).is_err());

        audio.load(&track("a"), 1.0, false);
        audio.seek(10.0).unwrap();
        assert_eq!(probe.borrow().position, 10.0);
    }

    #[test]
    fn interpret_drops_superseded_errors() {
        assert_eq!(AudioResourceManager::interpret(MediaEvent::Error(MediaError::Superseded)), None);
        assert_eq!(
            AudioResourceManager::interpret(MediaEvent::LoadedMetadata { duration: 200.0 }),
            Some(AudioEvent::MetadataReady { duration: 200.0 })
        );
        assert_eq!(
            AudioResourceManager::interpret(MediaEvent::Ended),
            Some(AudioEvent::PlaybackEnded)
        );
    }

    #[test]
    fn release_is_final() {
        let (mut audio, probe) = manager();
        audio.load(&track("a"), 1.0, false);
        audio.release();

        assert!(probe.borrow().released);
        assert!(audio.is_released());

        audio.load(&track("b"), 1.0, false);
        assert_eq!(audio.handles_created(), 1);
        assert!(audio.loaded_track().is_none());
    }
}
