use std::cell::RefCell;
use std::fmt;

use tracing::debug;

use super::History;
use crate::listeners::{Listener, Listeners, Subscription};
use crate::location::{Location, LocationChange};

/// Receives the fragment (without `#`) to scroll to; `""` means the top.
pub type ScrollHandler = Box<dyn Fn(&str)>;

struct Entries {
    entries: Vec<Location>,
    index: usize,
}

/// An in-process history.
///
/// Starts with a single `/` entry. Changes notify listeners synchronously;
/// scrolling is deferred until [`run_deferred`](MemoryHistory::run_deferred).
/// Scroll requests are only queued once a handler is installed with
/// [`on_scroll`](MemoryHistory::on_scroll).
///
/// # Example
///
/// ```
/// use oxide_nav::history::{History, MemoryHistory};
/// use oxide_nav::LocationChange;
///
/// let history = MemoryHistory::new();
/// history.set(LocationChange::push("/a"));
/// history.set(LocationChange::push("/b"));
/// history.go(-1);
/// assert_eq!(history.get().value, "/a");
///
/// history.set(LocationChange::push("/c"));
/// assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
/// ```
pub struct MemoryHistory {
    state: RefCell<Entries>,
    listeners: Listeners<Location>,
    scroll_handler: RefCell<Option<ScrollHandler>>,
    deferred: RefCell<Vec<String>>,
}

impl MemoryHistory {
    /// Creates a history positioned at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial("/")
    }

    /// Creates a history positioned at `initial`.
    #[must_use]
    pub fn with_initial(initial: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(Entries {
                entries: vec![Location::new(initial)],
                index: 0,
            }),
            listeners: Listeners::new(),
            scroll_handler: RefCell::new(None),
            deferred: RefCell::new(Vec::new()),
        }
    }

    /// Installs the handler used by [`run_deferred`](Self::run_deferred).
    pub fn on_scroll(&self, handler: impl Fn(&str) + 'static) {
        *self.scroll_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Runs queued scroll requests and returns how many ran.
    #[must_use]
    pub fn run_deferred(&self) -> usize {
        let queued: Vec<String> = self.deferred.borrow_mut().drain(..).collect();
        if let Some(handler) = self.scroll_handler.borrow().as_ref() {
            for hash in &queued {
                handler(hash);
            }
        }
        queued.len()
    }

    /// Returns the entry values, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|l| l.value.clone())
            .collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Returns `true` if there are no entries, which never happens: a
    /// memory history holds at least one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    fn current(&self) -> Location {
        let state = self.state.borrow();
        state.entries[state.index].clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryHistory")
            .field("entries", &state.entries)
            .field("index", &state.index)
            .finish_non_exhaustive()
    }
}

impl History for MemoryHistory {
    fn get(&self) -> Location {
        self.current()
    }

    fn set(&self, change: LocationChange) {
        let location = Location::new(change.value).with_state(change.state);
        {
            let mut state = self.state.borrow_mut();
            let index = state.index;
            if change.replace {
                debug!(location = %location.value, index, "Memory history replace");
                state.entries[index] = location.clone();
            } else {
                debug!(location = %location.value, index = index + 1, "Memory history push");
                state.entries.truncate(index + 1);
                state.entries.push(location.clone());
                state.index += 1;
            }
        }

        if change.scroll && self.scroll_handler.borrow().is_some() {
            let hash = location.hash().trim_start_matches('#').to_string();
            self.deferred.borrow_mut().push(hash);
        }
        self.listeners.notify(&location);
    }

    fn go(&self, delta: isize) {
        let location = {
            let mut state = self.state.borrow_mut();
            let last = state.entries.len() - 1;
            let target = state.index.saturating_add_signed(delta).min(last);
            debug!(from = state.index, to = target, delta, "Memory history go");
            state.index = target;
            state.entries[target].clone()
        };
        self.listeners.notify(&location);
    }

    fn listen(&self, listener: Listener<Location>) -> Subscription {
        self.listeners.add(listener)
    }

    fn depth(&self) -> usize {
        self.state.borrow().index
    }
}
