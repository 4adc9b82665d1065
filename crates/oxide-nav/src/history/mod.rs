//! History backends.
//!
//! A [`History`] owns the list of visited locations and the current
//! position in it. Two backends are provided:
//!
//! - [`MemoryHistory`] keeps entries in process, for tests and embedding.
//! - [`BrowserHistory`] adapts a platform session history through the
//!   [`NativeHistory`] seam.

mod browser;
mod memory;

pub use browser::{BrowserHistory, DEPTH_KEY, NativeHistory};
pub use memory::{MemoryHistory, ScrollHandler};

use std::rc::Rc;

use crate::listeners::{Listener, Subscription};
use crate::location::{Location, LocationChange};

/// A source of truth for the current location.
pub trait History {
    /// Returns the current location.
    fn get(&self) -> Location;

    /// Pushes or replaces an entry.
    fn set(&self, change: LocationChange);

    /// Moves `delta` entries through the history.
    fn go(&self, delta: isize);

    /// Registers a listener for location changes caused by traversal (and,
    /// for backends that report them, by [`set`](Self::set)).
    fn listen(&self, listener: Listener<Location>) -> Subscription;

    /// Returns the index of the current entry.
    fn depth(&self) -> usize;

    /// Moves one entry back.
    fn back(&self) {
        self.go(-1);
    }

    /// Moves one entry forward.
    fn forward(&self) {
        self.go(1);
    }
}

impl<H: History + ?Sized> History for Rc<H> {
    fn get(&self) -> Location {
        (**self).get()
    }

    fn set(&self, change: LocationChange) {
        (**self).set(change);
    }

    fn go(&self, delta: isize) {
        (**self).go(delta);
    }

    fn listen(&self, listener: Listener<Location>) -> Subscription {
        (**self).listen(listener)
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }
}
