//! Queue resolution
//!
//! Decides which track follows (or precedes) the current one. Two ordering
//! sources compete:
//!
//! ```text
//! 1. User queue      (non-empty)  -> step within the queue
//! 2. Ambient list    (otherwise)  -> step within the context list
//! 3. Both empty                   -> nothing to play
//! ```
//!
//! Stepping wraps at both ends. A current track that is not part of the list
//! in use resolves to that list's first element.

use crate::types::{Direction, PlaybackState, Track, TrackId};

/// Which list a resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    UserQueue,
    Ambient,
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub track: Track,
    pub from: ResolvedFrom,
}

/// Resolve the neighbour of `current` in the given direction
///
/// Returns `None` when both lists are empty.
pub fn resolve(
    direction: Direction,
    current: Option<&TrackId>,
    user_queue: &[Track],
    ambient: &[Track],
) -> Option<Resolution> {
    let (list, from) = if user_queue.is_empty() {
        (ambient, ResolvedFrom::Ambient)
    } else {
        (user_queue, ResolvedFrom::UserQueue)
    };

    step(direction, current, list).map(|track| Resolution {
        track: track.clone(),
        from,
    })
}

/// Resolve against a full state view
pub fn resolve_from_state(direction: Direction, state: &PlaybackState) -> Option<Resolution> {
    resolve(
        direction,
        state.current_track_id(),
        state.user_queue.tracks(),
        &state.ambient_track_list,
    )
}

fn step<'a>(direction: Direction, current: Option<&TrackId>, list: &'a [Track]) -> Option<&'a Track> {
    let len = list.len();
    if len == 0 {
        return None;
    }

    let Some(index) = current.and_then(|id| list.iter().position(|t| &t.id == id)) else {
        return list.first();
    };

    let target = match direction {
        Direction::Next => (index + 1) % len,
        Direction::Previous => (index + len - 1) % len,
    };
    list.get(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, format!("Track {id}"), format!("https://cdn.test/{id}.mp3")))
            .collect()
    }

    fn id(s: &str) -> TrackId {
        TrackId::new(s)
    }

    fn resolved_id(resolution: Option<Resolution>) -> Option<String> {
        resolution.map(|r| r.track.id.as_str().to_string())
    }

    #[test]
    fn next_within_queue() {
        let queue = tracks(&["a", "b", "c"]);
        let r = resolve(Direction::Next, Some(&id("b")), &queue, &[]).unwrap();
        assert_eq!(r.track.id.as_str(), "c");
        assert_eq!(r.from, ResolvedFrom::UserQueue);
    }

    #[test]
    fn next_wraps_to_first() {
        let queue = tracks(&["a", "b", "c"]);
        let r = resolve(Direction::Next, Some(&id("c")), &queue, &[]);
        assert_eq!(resolved_id(r).as_deref(), Some("a"));
    }

    #[test]
    fn previous_wraps_to_last() {
        let ambient = tracks(&["x", "y", "z"]);
        let r = resolve(Direction::Previous, Some(&id("x")), &[], &ambient);
        assert_eq!(resolved_id(r).as_deref(), Some("z"));
    }

    #[test]
    fn queue_takes_precedence_over_ambient() {
        let queue = tracks(&["a", "b"]);
        let ambient = tracks(&["a", "x", "y"]);

        let r = resolve(Direction::Next, Some(&id("a")), &queue, &ambient).unwrap();
        assert_eq!(r.track.id.as_str(), "b");
        assert_eq!(r.from, ResolvedFrom::UserQueue);
    }

    #[test]
    fn current_outside_queue_resolves_to_queue_head() {
        let queue = tracks(&["a", "b"]);
        let ambient = tracks(&["x", "y"]);

        let r = resolve(Direction::Next, Some(&id("x")), &queue, &ambient);
        assert_eq!(resolved_id(r).as_deref(), Some("a"));

        let r = resolve(Direction::Previous, Some(&id("x")), &queue, &ambient);
        assert_eq!(resolved_id(r).as_deref(), Some("a"));
    }

    #[test]
    fn falls_back_to_ambient_head() {
        let ambient = tracks(&["x", "y"]);
        let r = resolve(Direction::Next, Some(&id("elsewhere")), &[], &ambient).unwrap();
        assert_eq!(r.track.id.as_str(), "x");
        assert_eq!(r.from, ResolvedFrom::Ambient);
    }

    #[test]
    fn no_current_track_starts_at_head() {
        let ambient = tracks(&["x", "y"]);
        let r = resolve(Direction::Next, None, &[], &ambient);
        assert_eq!(resolved_id(r).as_deref(), Some("x"));
    }

    #[test]
    fn both_empty_is_exhausted() {
        assert!(resolve(Direction::Next, Some(&id("a")), &[], &[]).is_none());
        assert!(resolve(Direction::Previous, None, &[], &[]).is_none());
    }

    #[test]
    fn single_element_list_resolves_to_itself() {
        let ambient = tracks(&["solo"]);
        let r = resolve(Direction::Next, Some(&id("solo")), &[], &ambient);
        assert_eq!(resolved_id(r).as_deref(), Some("solo"));
    }

    #[test]
    fn resolves_from_state_view() {
        let mut state = PlaybackState::default();
        state.ambient_track_list = tracks(&["x", "y"]);
        state.current_track = Some(state.ambient_track_list[1].clone());

        let r = resolve_from_state(Direction::Next, &state);
        assert_eq!(resolved_id(r).as_deref(), Some("x"));
    }
}
