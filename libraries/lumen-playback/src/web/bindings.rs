//! JavaScript-facing player wrapper

use super::element::{WebAudioElement, DEFAULT_ELEMENT_ID};
use super::types::WasmTrack;
use crate::{
    element::MediaElement, events::PlaybackEvent, gate::LockedGroups, types::TrackId, PlaybackConfig, PlaybackError,
    Player,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Promise};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

/// How often queued media events are processed
const MEDIA_PUMP_INTERVAL_MS: u32 = 50;

type EventCallback = Rc<RefCell<Option<Function>>>;

/// WASM-compatible player
///
/// Wraps [`Player`] with a JavaScript-friendly API. Async operations return
/// promises; notifications are delivered to the `onEvent` callback.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: Player,
    on_event: EventCallback,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create the player
    ///
    /// `locked_groups` is an optional array of group ids whose tracks need
    /// unlocking before they can play.
    #[wasm_bindgen(constructor)]
    pub fn new(element_id: Option<String>, locked_groups: JsValue) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let groups: Vec<String> = if locked_groups.is_undefined() || locked_groups.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(locked_groups)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse locked groups: {e}")))?
        };

        let id = element_id.unwrap_or_else(|| DEFAULT_ELEMENT_ID.to_string());
        let factory = Box::new(move || Box::new(WebAudioElement::attach(&id)) as Box<dyn MediaElement>);

        let inner = Player::builder(PlaybackConfig::default(), factory)
            .gate(LockedGroups::new(groups))
            .build()
            .map_err(to_js_error)?;

        let on_event: EventCallback = Rc::new(RefCell::new(None));
        spawn_media_pump(inner.clone(), Rc::clone(&on_event));

        Ok(Self { inner, on_event })
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = playPause)]
    pub fn play_pause(&self) -> Promise {
        let player = self.inner.clone();
        let on_event = Rc::clone(&self.on_event);
        future_to_promise(async move {
            let result = player.play_pause().await;
            flush_events(&player, &on_event);
            result.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn stop(&self) {
        self.inner.stop();
        self.flush();
    }

    /// Resolves to the new track id, or `null` when nothing is left
    pub fn next(&self) -> Promise {
        let player = self.inner.clone();
        let on_event = Rc::clone(&self.on_event);
        future_to_promise(async move {
            let track = player.next().await;
            flush_events(&player, &on_event);
            Ok(track.map_or(JsValue::NULL, |t| JsValue::from_str(t.id.as_str())))
        })
    }

    /// Resolves to the new track id, or `null` when nothing is left
    pub fn prev(&self) -> Promise {
        let player = self.inner.clone();
        let on_event = Rc::clone(&self.on_event);
        future_to_promise(async move {
            let track = player.prev().await;
            flush_events(&player, &on_event);
            Ok(track.map_or(JsValue::NULL, |t| JsValue::from_str(t.id.as_str())))
        })
    }

    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, track: WasmTrack) -> Promise {
        let player = self.inner.clone();
        let on_event = Rc::clone(&self.on_event);
        future_to_promise(async move {
            player.select_track(track.into()).await;
            flush_events(&player, &on_event);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Seek to `time` seconds; returns the applied (clamped) position
    pub fn seek(&self, time: f64) -> Result<f64, JsValue> {
        self.inner.seek(time).map_err(to_js_error)
    }

    // ===== Volume Control =====

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) {
        self.inner.set_volume(volume);
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.inner.set_muted(muted);
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.inner.toggle_mute();
    }

    // ===== Queue & Context =====

    pub fn enqueue(&self, track: WasmTrack) -> bool {
        let added = self.inner.enqueue(track.into());
        self.flush();
        added
    }

    pub fn dequeue(&self, id: String) -> bool {
        let removed = self.inner.dequeue(&TrackId::new(id)).is_some();
        self.flush();
        removed
    }

    #[wasm_bindgen(js_name = reorderQueue)]
    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<(), JsValue> {
        let result = self.inner.reorder_queue(from, to);
        self.flush();
        result.map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&self) {
        self.inner.clear_queue();
        self.flush();
    }

    /// Replace the ambient list with an array of track objects
    #[wasm_bindgen(js_name = setAmbientTrackList)]
    pub fn set_ambient_track_list(&self, tracks: JsValue) -> Result<(), JsValue> {
        let tracks: Vec<WasmTrack> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {e}")))?;
        self.inner
            .set_ambient_track_list(tracks.into_iter().map(Into::into).collect());
        Ok(())
    }

    #[wasm_bindgen(js_name = setFloatingPlayerVisible)]
    pub fn set_floating_player_visible(&self, visible: bool) {
        self.inner.set_floating_player_visible(visible);
    }

    #[wasm_bindgen(js_name = setContentLocked)]
    pub fn set_content_locked(&self, locked: bool) {
        self.inner.set_content_locked(locked);
    }

    // ===== State =====

    /// Full state as a plain object
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.state().is_playing
    }

    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> Option<WasmTrack> {
        self.inner.state().current_track.as_ref().map(WasmTrack::from)
    }

    #[wasm_bindgen(js_name = isActiveSlot)]
    pub fn is_active_slot(&self, id: String) -> bool {
        self.inner.is_active_slot(&TrackId::new(id))
    }

    // ===== Navigation =====

    /// Report the host application's new location
    #[wasm_bindgen(js_name = locationChanged)]
    pub fn location_changed(&self, location: String) -> Promise {
        let player = self.inner.clone();
        let on_event = Rc::clone(&self.on_event);
        future_to_promise(async move {
            player.on_location_changed(&location).await;
            flush_events(&player, &on_event);
            Ok(JsValue::UNDEFINED)
        })
    }

    // ===== Event Callbacks =====

    /// Register the event callback; receives one plain object per event
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        *self.on_event.borrow_mut() = Some(callback);
    }

    /// Release the audio element; the player is unusable afterwards
    pub fn shutdown(&self) {
        self.inner.shutdown();
        self.flush();
    }

    fn flush(&self) {
        flush_events(&self.inner, &self.on_event);
    }
}

fn spawn_media_pump(player: Player, on_event: EventCallback) {
    spawn_local(async move {
        while !player.is_shut_down() {
            player.pump_media_events().await;
            flush_events(&player, &on_event);
            TimeoutFuture::new(MEDIA_PUMP_INTERVAL_MS).await;
        }
    });
}

fn flush_events(player: &Player, on_event: &EventCallback) {
    let events = player.drain_events();
    let callback = on_event.borrow();
    let Some(cb) = callback.as_ref() else {
        return;
    };
    for event in events {
        emit(cb, &event);
    }
}

fn emit(cb: &Function, event: &PlaybackEvent) {
    if let Ok(value) = serde_wasm_bindgen::to_value(event) {
        cb.call1(&JsValue::NULL, &value).ok();
    }
}

fn to_js_error(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}
