use std::fmt;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use tracing::debug;

use super::History;
use crate::listeners::{Listener, Listeners, Subscription};
use crate::location::{Location, LocationChange};

/// The state key holding an entry's position in the session history.
pub const DEPTH_KEY: &str = "_depth";

/// The platform session history.
///
/// Implemented by the host over the browser's `history` and `location`
/// objects, or by a fake in tests.
pub trait NativeHistory {
    /// The current `pathname + search + hash`.
    fn url(&self) -> String;

    /// The state stored with the current entry.
    fn state(&self) -> Option<Value>;

    /// The number of entries in the session history.
    fn length(&self) -> usize;

    /// Appends an entry after the current one, dropping forward entries.
    fn push_state(&self, state: Option<Value>, url: &str);

    /// Overwrites the current entry.
    fn replace_state(&self, state: Option<Value>, url: &str);

    /// Starts a traversal. The host reports completion through
    /// [`BrowserHistory::handle_popstate`].
    fn go(&self, delta: isize);

    /// Scrolls to the element with id `hash`, or to the top when it does not
    /// exist and `fallback_top` is set.
    fn scroll_to_hash(&self, _hash: &str, _fallback_top: bool) {}
}

fn read_depth(state: Option<&Value>) -> Option<usize> {
    state
        .and_then(|s| s.get(DEPTH_KEY))
        .and_then(Value::as_u64)
        .and_then(|d| usize::try_from(d).ok())
}

/// Stamps `depth` into `state`. Non-object states are left alone.
fn with_depth(state: Option<Value>, depth: Option<usize>) -> Option<Value> {
    let Some(depth) = depth else {
        return state;
    };
    match state {
        None => {
            let mut map = Map::new();
            map.insert(DEPTH_KEY.to_string(), depth.into());
            Some(Value::Object(map))
        }
        Some(Value::Object(mut map)) => {
            map.insert(DEPTH_KEY.to_string(), depth.into());
            Some(Value::Object(map))
        }
        Some(other) => {
            debug!("History state is not an object, depth not recorded");
            Some(other)
        }
    }
}

/// Removes the depth stamp. A state holding nothing else becomes `None`.
fn without_depth(state: Option<Value>) -> Option<Value> {
    match state {
        Some(Value::Object(mut map)) => {
            let stamped = map.remove(DEPTH_KEY).is_some();
            if stamped && map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        other => other,
    }
}

/// A [`History`] over the platform session history.
///
/// The platform cannot report the position of the current entry, so each
/// entry's index is stored in its state under [`DEPTH_KEY`] and hidden from
/// the application state returned by [`get`](History::get).
pub struct BrowserHistory<N> {
    native: N,
    listeners: Listeners<Location>,
}

impl<N: NativeHistory> BrowserHistory<N> {
    /// Wraps `native`, stamping the current entry's depth if it has none.
    #[must_use]
    pub fn new(native: N) -> Self {
        let history = Self {
            native,
            listeners: Listeners::new(),
        };
        history.save_current_depth();
        history
    }

    /// Returns the platform history.
    #[must_use]
    pub const fn native(&self) -> &N {
        &self.native
    }

    /// Notifies listeners that the platform moved to another entry.
    ///
    /// The host calls this from its `popstate` handler.
    pub fn handle_popstate(&self) {
        let location = self.get();
        debug!(location = %location.value, depth = self.depth(), "Popstate");
        self.save_current_depth();
        self.listeners.notify(&location);
    }

    fn save_current_depth(&self) {
        let state = self.native.state();
        if read_depth(state.as_ref()).is_none() {
            let depth = self.native.length().saturating_sub(1);
            self.native
                .replace_state(with_depth(state, Some(depth)), &self.native.url());
        }
    }
}

impl<N> fmt::Debug for BrowserHistory<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserHistory")
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<N: NativeHistory> History for BrowserHistory<N> {
    fn get(&self) -> Location {
        let url = self.native.url();
        let trimmed = url.trim_start_matches('/');
        let value = if trimmed.len() < url.len() {
            format!("/{trimmed}")
        } else {
            url
        };
        Location::new(value).with_state(without_depth(self.native.state()))
    }

    fn set(&self, change: LocationChange) {
        if change.replace {
            let depth = read_depth(self.native.state().as_ref());
            debug!(location = %change.value, ?depth, "Browser history replace");
            self.native
                .replace_state(with_depth(change.state, depth), &change.value);
        } else {
            debug!(location = %change.value, "Browser history push");
            self.native.push_state(change.state, &change.value);
        }

        let location = Location::new(self.native.url());
        let hash = location.hash().trim_start_matches('#');
        let hash = percent_decode_str(hash).decode_utf8_lossy();
        self.native.scroll_to_hash(&hash, change.scroll);

        self.save_current_depth();
    }

    fn go(&self, delta: isize) {
        debug!(delta, "Browser history go");
        self.native.go(delta);
    }

    fn listen(&self, listener: Listener<Location>) -> Subscription {
        self.listeners.add(listener)
    }

    fn depth(&self) -> usize {
        read_depth(self.native.state().as_ref())
            .unwrap_or_else(|| self.native.length().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Session {
        entries: RefCell<Vec<(String, Option<Value>)>>,
        index: RefCell<usize>,
        scrolls: RefCell<Vec<(String, bool)>>,
    }

    impl Session {
        fn at(url: &str) -> Self {
            let session = Self::default();
            session.entries.borrow_mut().push((url.to_string(), None));
            session
        }

        fn raw_state(&self) -> Option<Value> {
            self.state()
        }
    }

    impl NativeHistory for Session {
        fn url(&self) -> String {
            self.entries.borrow()[*self.index.borrow()].0.clone()
        }

        fn state(&self) -> Option<Value> {
            self.entries.borrow()[*self.index.borrow()].1.clone()
        }

        fn length(&self) -> usize {
            self.entries.borrow().len()
        }

        fn push_state(&self, state: Option<Value>, url: &str) {
            let mut index = self.index.borrow_mut();
            let mut entries = self.entries.borrow_mut();
            entries.truncate(*index + 1);
            entries.push((url.to_string(), state));
            *index += 1;
        }

        fn replace_state(&self, state: Option<Value>, url: &str) {
            let index = *self.index.borrow();
            self.entries.borrow_mut()[index] = (url.to_string(), state);
        }

        fn go(&self, delta: isize) {
            let last = self.entries.borrow().len() - 1;
            let mut index = self.index.borrow_mut();
            *index = index.saturating_add_signed(delta).min(last);
        }

        fn scroll_to_hash(&self, hash: &str, fallback_top: bool) {
            self.scrolls.borrow_mut().push((hash.to_string(), fallback_top));
        }
    }

    #[test]
    fn test_new_stamps_depth() {
        let history = BrowserHistory::new(Session::at("/"));
        assert_eq!(history.native().raw_state(), Some(json!({ "_depth": 0 })));
        assert_eq!(history.get().state, None);
        assert_eq!(history.depth(), 0);
    }

    #[test]
    fn test_push_records_depth() {
        let history = BrowserHistory::new(Session::at("/"));
        history.set(LocationChange::push("/a").state(json!({ "from": "home" })));
        history.set(LocationChange::push("/b"));
        assert_eq!(history.depth(), 2);

        history.native().go(-1);
        assert_eq!(history.depth(), 1);
        let location = history.get();
        assert_eq!(location.value, "/a");
        assert_eq!(location.state, Some(json!({ "from": "home" })));
    }

    #[test]
    fn test_replace_keeps_depth() {
        let history = BrowserHistory::new(Session::at("/"));
        history.set(LocationChange::push("/a"));
        history.set(LocationChange::replace("/b").state(json!({ "k": true })));
        assert_eq!(history.depth(), 1);
        assert_eq!(
            history.native().raw_state(),
            Some(json!({ "k": true, "_depth": 1 }))
        );
    }

    #[test]
    fn test_get_collapses_leading_slashes() {
        let history = BrowserHistory::new(Session::at("///a/b?x#y"));
        assert_eq!(history.get().value, "/a/b?x#y");
    }

    #[test]
    fn test_scroll_decodes_hash() {
        let history = BrowserHistory::new(Session::at("/"));
        history.set(LocationChange::push("/doc#caf%C3%A9").scroll(false));
        assert_eq!(
            *history.native().scrolls.borrow(),
            vec![("café".to_string(), false)]
        );
    }

    #[test]
    fn test_popstate_notifies() {
        let history = BrowserHistory::new(Session::at("/"));
        history.set(LocationChange::push("/a"));
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let log = std::rc::Rc::clone(&seen);
        let _sub = history.listen(std::rc::Rc::new(move |l: &Location| {
            log.borrow_mut().push(l.value.clone())
        }));

        history.go(-1);
        history.handle_popstate();
        assert_eq!(*seen.borrow(), vec!["/"]);
    }

    #[test]
    fn test_non_object_state_is_preserved() {
        assert_eq!(with_depth(Some(json!("x")), Some(3)), Some(json!("x")));
        assert_eq!(without_depth(Some(json!({ "_depth": 2 }))), None);
        assert_eq!(
            without_depth(Some(json!({ "a": 1, "_depth": 2 }))),
            Some(json!({ "a": 1 }))
        );
    }
}
