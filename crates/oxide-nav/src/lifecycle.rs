//! Before-leave interception.
//!
//! Listeners registered with a [`BeforeLeave`] are asked before every
//! transition and may veto it with [`BeforeLeaveEvent::prevent_default`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::listeners::{Listeners, Subscription};
use crate::location::Location;
use crate::router::NavigateOptions;

/// Where a transition is heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A location string.
    Path(String),
    /// A backward history traversal by this many entries (negative).
    Delta(isize),
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Delta(delta) => write!(f, "go({delta})"),
        }
    }
}

/// A transition that a listener declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercepted {
    /// The declined target.
    pub target: NavigationTarget,
    /// The options it was requested with.
    pub options: NavigateOptions,
}

/// The event passed to before-leave listeners.
#[derive(Debug)]
pub struct BeforeLeaveEvent {
    to: NavigationTarget,
    options: NavigateOptions,
    from: Location,
    prevented: Cell<bool>,
}

impl BeforeLeaveEvent {
    /// Returns the target.
    #[must_use]
    pub const fn to(&self) -> &NavigationTarget {
        &self.to
    }

    /// Returns the traversal delta for backward history moves.
    #[must_use]
    pub const fn delta(&self) -> Option<isize> {
        match self.to {
            NavigationTarget::Delta(delta) => Some(delta),
            NavigationTarget::Path(_) => None,
        }
    }

    /// Returns the navigation options.
    #[must_use]
    pub const fn options(&self) -> &NavigateOptions {
        &self.options
    }

    /// Returns the location being left.
    #[must_use]
    pub const fn from(&self) -> &Location {
        &self.from
    }

    /// Cancels the transition.
    pub fn prevent_default(&self) {
        self.prevented.set(true);
    }

    /// Returns `true` once any listener has cancelled.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

/// A before-leave listener registry.
#[derive(Debug, Default)]
pub struct BeforeLeave {
    listeners: Listeners<BeforeLeaveEvent>,
    pending: Cell<bool>,
    ignore_next: Cell<bool>,
    intercepted: RefCell<Option<Intercepted>>,
}

impl BeforeLeave {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    #[must_use]
    pub fn subscribe(&self, listener: impl Fn(&BeforeLeaveEvent) + 'static) -> Subscription {
        self.listeners.add(Rc::new(listener))
    }

    /// Asks every listener whether the transition may proceed.
    ///
    /// All listeners are called even after one has cancelled. A declined
    /// target is remembered for [`take_intercepted`](Self::take_intercepted).
    #[must_use]
    pub fn confirm(&self, to: NavigationTarget, options: &NavigateOptions, from: &Location) -> bool {
        if self.ignore_next.replace(false) {
            debug!(%to, "Before-leave check skipped");
            return true;
        }
        if self.listeners.is_empty() {
            return true;
        }

        let event = BeforeLeaveEvent {
            to,
            options: options.clone(),
            from: from.clone(),
            prevented: Cell::new(false),
        };
        self.pending.set(true);
        self.listeners.notify(&event);
        self.pending.set(false);

        if event.default_prevented() {
            debug!(to = %event.to, from = %event.from.value, "Navigation blocked");
            *self.intercepted.borrow_mut() = Some(Intercepted {
                target: event.to,
                options: event.options,
            });
            false
        } else {
            true
        }
    }

    /// Returns `true` while listeners are being consulted.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Lets the next transition through without consulting listeners.
    pub fn ignore_next(&self) {
        self.ignore_next.set(true);
    }

    /// Withdraws a pending [`ignore_next`](Self::ignore_next).
    pub fn cancel_ignore(&self) {
        if self.ignore_next.replace(false) {
            debug!("Pending before-leave skip withdrawn");
        }
    }

    /// Takes the most recently declined transition.
    #[must_use]
    pub fn take_intercepted(&self) -> Option<Intercepted> {
        self.intercepted.borrow_mut().take()
    }

    /// Removes all listeners and forgets any declined transition.
    pub fn clear(&self) {
        self.listeners.clear();
        self.intercepted.borrow_mut().take();
        self.ignore_next.set(false);
    }
}
