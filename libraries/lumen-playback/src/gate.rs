//! Content gating seam
//!
//! The player never unlocks anything itself. It asks a gate whether a track
//! needs an external action first and surfaces the answer as the
//! `content_locked` flag.

use crate::types::Track;
use std::collections::HashSet;

/// Decides whether a track requires unlocking before playback
pub trait ContentGate {
    fn is_locked(&self, track: &Track) -> bool;
}

/// Gate that never locks anything
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl ContentGate for OpenGate {
    fn is_locked(&self, _track: &Track) -> bool {
        false
    }
}

/// Locks every track whose group identity is in the set
#[derive(Debug, Clone, Default)]
pub struct LockedGroups {
    groups: HashSet<String>,
}

impl LockedGroups {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContentGate for LockedGroups {
    fn is_locked(&self, track: &Track) -> bool {
        track
            .group_id
            .as_ref()
            .is_some_and(|group| self.groups.contains(group))
    }
}
