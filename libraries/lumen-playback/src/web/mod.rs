//! Browser backend
//!
//! `HTMLAudioElement`-backed media handle, a browser timer clock and the
//! JavaScript-facing bindings for the player.

mod bindings;
mod clock;
mod element;
mod types;

pub use bindings::WasmPlayer;
pub use clock::BrowserClock;
pub use element::{WebAudioElement, DEFAULT_ELEMENT_ID};
pub use types::WasmTrack;
