//! `HTMLAudioElement` media handle

use crate::element::{MediaElement, MediaEvent, PlayRequest};
use crate::error::MediaError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, DomException, HtmlAudioElement};

/// DOM id of the shared audio element
pub const DEFAULT_ELEMENT_ID: &str = "lumen-audio";

type EventQueue = Rc<RefCell<VecDeque<MediaEvent>>>;

/// The application's one audio element
///
/// DOM events are queued and handed to the player through
/// [`MediaElement::drain_events`].
pub struct WebAudioElement {
    audio: Option<HtmlAudioElement>,
    queue: EventQueue,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl WebAudioElement {
    /// Reuse the element with `id` or create it hidden under `<body>`
    pub fn attach(id: &str) -> Self {
        let queue: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let Some(audio) = get_or_create_audio_element(id) else {
            warn!(id, "Could not create audio element, playback disabled");
            return Self {
                audio: None,
                queue,
                listeners: Vec::new(),
            };
        };

        let mut element = Self {
            audio: Some(audio.clone()),
            queue,
            listeners: Vec::new(),
        };

        element.listen(&audio, "loadedmetadata", |audio| {
            Some(MediaEvent::LoadedMetadata {
                duration: finite_or_zero(audio.duration()),
            })
        });
        element.listen(&audio, "timeupdate", |audio| {
            Some(MediaEvent::TimeUpdate {
                position: finite_or_zero(audio.current_time()),
            })
        });
        element.listen(&audio, "ended", |_| Some(MediaEvent::Ended));
        element.listen(&audio, "pause", |_| Some(MediaEvent::Paused));
        element.listen(&audio, "playing", |_| Some(MediaEvent::Playing));
        element.listen(&audio, "error", |audio| audio.error().map(|e| MediaEvent::Error(media_error_from_code(e.code()))));

        debug!(id, "Audio element attached");
        element
    }

    fn listen(
        &mut self,
        audio: &HtmlAudioElement,
        name: &'static str,
        map: impl Fn(&HtmlAudioElement) -> Option<MediaEvent> + 'static,
    ) {
        let queue = Rc::clone(&self.queue);
        let target = audio.clone();
        let callback = Closure::wrap(Box::new(move || {
            if let Some(event) = map(&target) {
                queue.borrow_mut().push_back(event);
            }
        }) as Box<dyn FnMut()>);

        if audio
            .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            .is_err()
        {
            warn!(event = name, "Failed to register media listener");
        }
        self.listeners.push((name, callback));
    }
}

impl MediaElement for WebAudioElement {
    fn set_source(&mut self, url: &str) {
        if let Some(audio) = &self.audio {
            audio.set_src(url);
        }
    }

    fn clear_source(&mut self) {
        if let Some(audio) = &self.audio {
            let _ = audio.remove_attribute("src");
            audio.load();
        }
    }

    fn load(&mut self) {
        if let Some(audio) = &self.audio {
            audio.load();
        }
    }

    fn play(&mut self) -> PlayRequest {
        let Some(audio) = &self.audio else {
            return Box::pin(future::ready(Err(MediaError::InvalidState("no audio element".into()))));
        };
        match audio.play() {
            Ok(promise) => {
                let request = JsFuture::from(promise);
                Box::pin(async move { request.await.map(|_| ()).map_err(media_error_from_js) })
            }
            Err(err) => Box::pin(future::ready(Err(media_error_from_js(err)))),
        }
    }

    fn pause(&mut self) {
        if let Some(audio) = &self.audio {
            let _ = audio.pause();
        }
    }

    fn is_paused(&self) -> bool {
        match &self.audio {
            Some(audio) => audio.paused(),
            None => true,
        }
    }

    fn current_time(&self) -> f64 {
        self.audio.as_ref().map_or(0.0, |a| finite_or_zero(a.current_time()))
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), MediaError> {
        match &self.audio {
            Some(audio) if !audio.src().is_empty() => {
                audio.set_current_time(seconds);
                Ok(())
            }
            _ => Err(MediaError::InvalidState("no source loaded".into())),
        }
    }

    fn duration(&self) -> f64 {
        self.audio.as_ref().map_or(0.0, |a| finite_or_zero(a.duration()))
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(audio) = &self.audio {
            audio.set_volume(f64::from(volume));
        }
    }

    fn set_muted(&mut self, muted: bool) {
        if let Some(audio) = &self.audio {
            audio.set_muted(muted);
        }
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    fn release(&mut self) {
        let Some(audio) = self.audio.take() else {
            return;
        };
        for (name, callback) in self.listeners.drain(..) {
            let _ = audio.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        let _ = audio.pause();
        let _ = audio.remove_attribute("src");
        audio.remove();
        self.queue.borrow_mut().clear();
    }
}

fn get_or_create_audio_element(id: &str) -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(id) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(id);
    audio.set_attribute("preload", "metadata").ok()?;
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

/// Map a rejected `play()` promise
fn media_error_from_js(value: JsValue) -> MediaError {
    let Some(exception) = value.dyn_ref::<DomException>() else {
        return MediaError::Other(format!("{value:?}"));
    };
    let message = exception.message();
    match exception.name().as_str() {
        "AbortError" => MediaError::Superseded,
        "NotAllowedError" => MediaError::NotAllowed(message),
        "NotSupportedError" => MediaError::Unsupported(message),
        "InvalidStateError" => MediaError::InvalidState(message),
        _ => MediaError::Other(message),
    }
}

/// Map `HTMLMediaElement.error.code`
fn media_error_from_code(code: u16) -> MediaError {
    match code {
        web_sys::MediaError::MEDIA_ERR_ABORTED => MediaError::Superseded,
        web_sys::MediaError::MEDIA_ERR_NETWORK => MediaError::Network("fetch failed".into()),
        web_sys::MediaError::MEDIA_ERR_DECODE => MediaError::Decode("decode failed".into()),
        web_sys::MediaError::MEDIA_ERR_SRC_NOT_SUPPORTED => MediaError::Unsupported("source not supported".into()),
        other => MediaError::Other(format!("media error code {other}")),
    }
}

// NaN while metadata is unknown, +inf for live streams
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
