//! Shared test fixtures: a scriptable in-memory media element

#![allow(dead_code)]

use lumen_playback::element::PlayRequest;
use lumen_playback::{MediaElement, MediaError, MediaEvent, PlaybackConfig, PlaybackEvent, Player, Track};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::oneshot;

type PlayResult = Result<(), MediaError>;

/// How the next `play()` call ends
pub enum PlayScript {
    /// Resolve immediately
    Resolve,
    /// Reject immediately; the element stays paused
    Reject(MediaError),
    /// Stay pending until released by the test (or aborted by load/pause)
    Hold,
}

/// Everything the fake element records
pub struct Probe {
    pub source: Option<String>,
    pub paused: bool,
    pub volume: f32,
    pub muted: bool,
    pub position: f64,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub loads: usize,
    pub released: bool,
    pub scripts: VecDeque<PlayScript>,
    pub pending: Vec<oneshot::Sender<PlayResult>>,
    pub events: Vec<MediaEvent>,
}

impl Probe {
    fn new() -> Self {
        Self {
            source: None,
            paused: true,
            volume: 1.0,
            muted: false,
            position: 0.0,
            play_calls: 0,
            pause_calls: 0,
            loads: 0,
            released: false,
            scripts: VecDeque::new(),
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn script(&mut self, script: PlayScript) {
        self.scripts.push_back(script);
    }

    /// Take the pending play requests so load/pause cannot abort them
    pub fn take_pending(&mut self) -> Vec<oneshot::Sender<PlayResult>> {
        std::mem::take(&mut self.pending)
    }

    // Browsers reject in-flight play() promises with AbortError on load/pause
    fn abort_pending(&mut self) {
        for tx in self.pending.drain(..) {
            let _ = tx.send(Err(MediaError::Superseded));
        }
    }
}

pub type SharedProbe = Rc<RefCell<Probe>>;

/// In-memory stand-in for the browser's audio element
pub struct FakeElement {
    probe: SharedProbe,
}

impl MediaElement for FakeElement {
    fn set_source(&mut self, url: &str) {
        self.probe.borrow_mut().source = Some(url.to_string());
    }

    fn clear_source(&mut self) {
        self.probe.borrow_mut().source = None;
    }

    fn load(&mut self) {
        let mut probe = self.probe.borrow_mut();
        probe.abort_pending();
        probe.loads += 1;
        probe.position = 0.0;
        probe.paused = true;
    }

    fn play(&mut self) -> PlayRequest {
        let mut probe = self.probe.borrow_mut();
        probe.play_calls += 1;
        probe.paused = false;

        match probe.scripts.pop_front().unwrap_or(PlayScript::Resolve) {
            PlayScript::Resolve => Box::pin(async { Ok(()) }),
            PlayScript::Reject(err) => {
                probe.paused = true;
                Box::pin(async move { Err(err) })
            }
            PlayScript::Hold => {
                let (tx, rx) = oneshot::channel();
                probe.pending.push(tx);
                Box::pin(async move { rx.await.unwrap_or(Err(MediaError::Superseded)) })
            }
        }
    }

    fn pause(&mut self) {
        let mut probe = self.probe.borrow_mut();
        probe.abort_pending();
        probe.pause_calls += 1;
        probe.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.probe.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.probe.borrow().position
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), MediaError> {
        let mut probe = self.probe.borrow_mut();
        if probe.source.is_none() {
            return Err(MediaError::InvalidState("no source".into()));
        }
        probe.position = seconds;
        Ok(())
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn set_volume(&mut self, volume: f32) {
        self.probe.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.probe.borrow_mut().muted = muted;
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.probe.borrow_mut().events)
    }

    fn release(&mut self) {
        self.probe.borrow_mut().released = true;
    }
}

/// Player over a fake element with default config
pub fn fake_player() -> (Player, SharedProbe) {
    fake_player_with(PlaybackConfig::default(), |builder| builder)
}

/// Player over a fake element, letting the test adjust the builder
pub fn fake_player_with(
    config: PlaybackConfig,
    customize: impl FnOnce(lumen_playback::PlayerBuilder) -> lumen_playback::PlayerBuilder,
) -> (Player, SharedProbe) {
    init_tracing();

    let probe = Rc::new(RefCell::new(Probe::new()));
    let handle = Rc::clone(&probe);
    let factory = Box::new(move || Box::new(FakeElement { probe: handle }) as Box<dyn MediaElement>);

    let player = customize(Player::builder(config, factory))
        .build()
        .expect("test config is valid");
    (player, probe)
}

pub fn track(id: &str) -> Track {
    Track::new(id, format!("Track {id}"), url(id))
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn url(id: &str) -> String {
    format!("https://cdn.test/{id}.mp3")
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn current_id(player: &Player) -> Option<String> {
    player.state().current_track.map(|t| t.id.as_str().to_string())
}

pub fn count_events(events: &[PlaybackEvent], matches: impl Fn(&PlaybackEvent) -> bool) -> usize {
    events.iter().filter(|e| matches(e)).count()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lumen_playback=debug")
        .with_test_writer()
        .try_init();
}
