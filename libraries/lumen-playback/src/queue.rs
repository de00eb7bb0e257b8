//! User-curated queue
//!
//! An explicitly ordered list of tracks that takes precedence over the
//! ambient track list when resolving what plays next. Track identities are
//! unique inside the queue.

use crate::types::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// User queue with unique track identities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserQueue {
    tracks: Vec<Track>,
}

impl UserQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Append track to the end of the queue
    ///
    /// Returns `false` (and leaves the queue untouched) when a track with the
    /// same identity is already queued.
    pub fn enqueue(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove track by identity
    ///
    /// Returns the removed track, `None` if it was not queued.
    pub fn dequeue(&mut self, id: &TrackId) -> Option<Track> {
        let index = self.position(id)?;
        Some(self.tracks.remove(index))
    }

    /// Move track from `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), usize> {
        let len = self.tracks.len();
        if from >= len {
            return Err(from);
        }
        if to >= len {
            return Err(to);
        }
        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        Ok(())
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Position of a track identity in the queue
    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.position(id).is_some()
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All queued tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
