//! WASM-compatible type definitions

use crate::types::{Track, TrackId};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// WASM-compatible track
#[derive(Serialize, Deserialize, Clone, Debug)]
#[wasm_bindgen]
pub struct WasmTrack {
    id: String,
    title: String,
    artist: String,
    artwork_url: Option<String>,
    media_url: String,
    group_id: Option<String>,
}

#[wasm_bindgen]
impl WasmTrack {
    #[wasm_bindgen(constructor)]
    pub fn new(id: String, title: String, media_url: String) -> Self {
        Self {
            id,
            title,
            artist: String::new(),
            artwork_url: None,
            media_url,
            group_id: None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.title.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn artist(&self) -> String {
        self.artist.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_artist(&mut self, artist: String) {
        self.artist = artist;
    }

    #[wasm_bindgen(getter, js_name = artworkUrl)]
    pub fn artwork_url(&self) -> Option<String> {
        self.artwork_url.clone()
    }

    #[wasm_bindgen(setter, js_name = artworkUrl)]
    pub fn set_artwork_url(&mut self, url: Option<String>) {
        self.artwork_url = url;
    }

    #[wasm_bindgen(getter, js_name = mediaUrl)]
    pub fn media_url(&self) -> String {
        self.media_url.clone()
    }

    #[wasm_bindgen(getter, js_name = groupId)]
    pub fn group_id(&self) -> Option<String> {
        self.group_id.clone()
    }

    #[wasm_bindgen(setter, js_name = groupId)]
    pub fn set_group_id(&mut self, group_id: Option<String>) {
        self.group_id = group_id;
    }
}

impl From<&Track> for WasmTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.as_str().to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork_url: track.artwork_url.clone(),
            media_url: track.media_url.clone(),
            group_id: track.group_id.clone(),
        }
    }
}

impl From<WasmTrack> for Track {
    fn from(track: WasmTrack) -> Self {
        Self {
            id: TrackId::new(track.id),
            title: track.title,
            artist: track.artist,
            artwork_url: track.artwork_url,
            media_url: track.media_url,
            group_id: track.group_id,
        }
    }
}
