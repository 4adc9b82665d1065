//! Listener registries and subscriptions.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A shared callback.
pub type Listener<A> = Rc<dyn Fn(&A)>;

struct Registry<A> {
    next_id: u64,
    entries: Vec<(u64, Listener<A>)>,
}

/// A set of callbacks notified in registration order.
///
/// Listeners may subscribe or unsubscribe while a notification is running:
/// the set is snapshotted before dispatch, and a listener removed mid-dispatch
/// is skipped.
pub struct Listeners<A> {
    registry: Rc<RefCell<Registry<A>>>,
}

impl<A: 'static> Listeners<A> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers `listener`. Dropping the returned handle keeps it registered.
    #[must_use]
    pub fn add(&self, listener: Listener<A>) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak: Weak<RefCell<Registry<A>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().entries.retain(|(i, _)| *i != id);
            }
        })
    }

    /// Calls every registered listener with `arg`.
    pub fn notify(&self, arg: &A) {
        let snapshot = self.registry.borrow().entries.clone();
        for (id, listener) in snapshot {
            let live = self.registry.borrow().entries.iter().any(|(i, _)| *i == id);
            if live {
                listener(arg);
            }
        }
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: 'static> Default for Listeners<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Listeners<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.registry.borrow().entries.len())
            .finish_non_exhaustive()
    }
}

/// A handle that removes a listener.
///
/// Unsubscribing is idempotent.
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Wraps a cancellation callback.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// Removes the listener. Later calls do nothing.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Returns `true` until [`unsubscribe`](Self::unsubscribe) is called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Listener<String> {
        let log = Rc::clone(log);
        Rc::new(move |v: &String| log.borrow_mut().push(format!("{tag}:{v}")))
    }

    #[test]
    fn test_notifies_in_order() {
        let listeners = Listeners::<String>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _a = listeners.add(recorder(&log, "a"));
        let _b = listeners.add(recorder(&log, "b"));

        listeners.notify(&"/x".to_string());
        assert_eq!(*log.borrow(), vec!["a:/x", "b:/x"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let listeners = Listeners::<String>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = listeners.add(recorder(&log, "a"));
        let _b = listeners.add(recorder(&log, "b"));

        a.unsubscribe();
        a.unsubscribe();
        assert!(!a.is_active());
        assert_eq!(listeners.len(), 1);

        listeners.notify(&"/y".to_string());
        assert_eq!(*log.borrow(), vec!["b:/y"]);
    }

    #[test]
    fn test_removal_during_notify_skips_removed() {
        let listeners = Listeners::<String>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let handle = Rc::clone(&second);
        let _first = listeners.add(Rc::new(move |_: &String| {
            if let Some(sub) = handle.borrow().as_ref() {
                sub.unsubscribe();
            }
        }));
        *second.borrow_mut() = Some(listeners.add(recorder(&log, "second")));

        listeners.notify(&"/z".to_string());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_add_during_notify_waits_for_next_round() {
        let listeners = Rc::new(Listeners::<String>::new());
        let calls = Rc::new(Cell::new(0));
        let keep: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let (registry, counter, keep_inner) =
            (Rc::clone(&listeners), Rc::clone(&calls), Rc::clone(&keep));
        let _adder = listeners.add(Rc::new(move |_: &String| {
            let counter = Rc::clone(&counter);
            let sub = registry.add(Rc::new(move |_: &String| counter.set(counter.get() + 1)));
            keep_inner.borrow_mut().push(sub);
        }));

        listeners.notify(&"/1".to_string());
        assert_eq!(calls.get(), 0);
        listeners.notify(&"/2".to_string());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let listeners = Listeners::<String>::new();
        let sub = listeners.add(Rc::new(|_: &String| {}));
        drop(listeners);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
