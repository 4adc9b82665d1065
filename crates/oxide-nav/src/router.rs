//! Navigation coordination.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use oxide_route::{BranchMatch, Params, RouteTable, is_external, resolve_path};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::RouterConfig;
use crate::error::{NavError, Result};
use crate::history::History;
use crate::lifecycle::{BeforeLeave, BeforeLeaveEvent, NavigationTarget};
use crate::listeners::{Listeners, Subscription};
use crate::location::{Location, LocationChange};

/// The default limit on navigations started from location listeners.
pub const DEFAULT_MAX_REDIRECTS: usize = 100;

/// Options for [`Router::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Resolve the target against the base and the current route.
    pub resolve: bool,
    /// Replace the current entry instead of pushing.
    pub replace: bool,
    /// Scroll to the target's hash (or top) after committing.
    pub scroll: bool,
    /// State to store with the entry.
    pub state: Option<Value>,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            resolve: true,
            replace: false,
            scroll: true,
            state: None,
        }
    }
}

impl NavigateOptions {
    /// Sets whether to resolve relative targets.
    #[must_use]
    pub fn resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    /// Sets whether to replace the current entry.
    #[must_use]
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Sets whether to scroll.
    #[must_use]
    pub fn scroll(mut self, scroll: bool) -> Self {
        self.scroll = scroll;
        self
    }

    /// Sets the entry state.
    #[must_use]
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

/// What a navigation request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The history moved to this location.
    Committed(Location),
    /// A before-leave listener cancelled the transition.
    Blocked,
    /// The target equals the current location and state.
    Unchanged,
    /// The target is an absolute URL outside the router.
    External(String),
    /// A history traversal was started; listeners hear about the result.
    Traversed(isize),
}

impl NavigationOutcome {
    /// Returns `true` for [`Committed`](Self::Committed).
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

struct Current {
    location: Location,
    depth: usize,
    matched: Option<BranchMatch>,
}

struct RouterInner {
    history: Rc<dyn History>,
    table: RouteTable,
    max_redirects: usize,
    before_leave: BeforeLeave,
    listeners: Listeners<Location>,
    current: RefCell<Current>,
    committing: Cell<bool>,
    ignore_next_change: Cell<bool>,
    redirects: Cell<usize>,
    redirect_overflow: RefCell<Option<String>>,
    history_subscription: RefCell<Option<Subscription>>,
    disposed: Cell<bool>,
}

/// Coordinates route matching, history, and before-leave guards.
///
/// `Router` is a cheap handle; clones share state. Location listeners that
/// keep a clone form a reference cycle until [`dispose`](Router::dispose).
///
/// # Example
///
/// ```
/// use std::rc::Rc;
///
/// use oxide_nav::history::MemoryHistory;
/// use oxide_nav::{NavigateOptions, Router};
/// use oxide_route::RouteDefinition;
///
/// let history = Rc::new(MemoryHistory::new());
/// let router = Router::with_routes(
///     history,
///     "/",
///     vec![RouteDefinition::new("/users/:id").name("user")],
/// )
/// .unwrap();
///
/// let outcome = router.navigate("/users/7", NavigateOptions::default()).unwrap();
/// assert!(outcome.is_committed());
/// assert_eq!(router.params().get("id"), Some("7"));
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Builds a router from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if a route pattern or filter in `config` does not compile.
    pub fn new(history: Rc<dyn History>, config: &RouterConfig) -> Result<Self> {
        let table = RouteTable::new(&config.base, config.route_definitions()?)?;
        Ok(Self::from_table(history, table, config.max_redirects))
    }

    /// Builds a router over code-declared routes.
    ///
    /// # Errors
    ///
    /// Fails if a route pattern does not compile or a name is declared twice.
    pub fn with_routes(
        history: Rc<dyn History>,
        base: &str,
        routes: Vec<oxide_route::RouteDefinition>,
    ) -> Result<Self> {
        let table = RouteTable::new(base, routes)?;
        Ok(Self::from_table(history, table, DEFAULT_MAX_REDIRECTS))
    }

    /// Builds a router over a compiled route table.
    #[must_use]
    pub fn from_table(history: Rc<dyn History>, table: RouteTable, max_redirects: usize) -> Self {
        let location = history.get();
        let depth = history.depth();
        let matched = table.match_path(location.pathname());
        debug!(location = %location.value, depth, "Router started");

        let inner = Rc::new(RouterInner {
            history,
            table,
            max_redirects,
            before_leave: BeforeLeave::new(),
            listeners: Listeners::new(),
            current: RefCell::new(Current {
                location,
                depth,
                matched,
            }),
            committing: Cell::new(false),
            ignore_next_change: Cell::new(false),
            redirects: Cell::new(0),
            redirect_overflow: RefCell::new(None),
            history_subscription: RefCell::new(None),
            disposed: Cell::new(false),
        });

        let weak: Weak<RouterInner> = Rc::downgrade(&inner);
        let subscription = inner.history.listen(Rc::new(move |_: &Location| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_history_change();
            }
        }));
        *inner.history_subscription.borrow_mut() = Some(subscription);

        Self { inner }
    }

    /// Navigates to `to`.
    ///
    /// # Errors
    ///
    /// [`NavError::Disposed`] after [`dispose`](Self::dispose), and
    /// [`NavError::TooManyRedirects`] when location listeners keep
    /// navigating.
    pub fn navigate(&self, to: &str, options: NavigateOptions) -> Result<NavigationOutcome> {
        self.inner.navigate(to, options, false)
    }

    /// Moves `delta` entries through the history.
    ///
    /// # Errors
    ///
    /// [`NavError::Disposed`] after [`dispose`](Self::dispose).
    pub fn go(&self, delta: isize) -> Result<()> {
        self.inner.ensure_active()?;
        self.inner.history.go(delta);
        Ok(())
    }

    /// Moves one entry back.
    ///
    /// # Errors
    ///
    /// Fails like [`go`](Self::go).
    pub fn back(&self) -> Result<()> {
        self.go(-1)
    }

    /// Moves one entry forward.
    ///
    /// # Errors
    ///
    /// Fails like [`go`](Self::go).
    pub fn forward(&self) -> Result<()> {
        self.go(1)
    }

    /// Re-attempts the most recently blocked transition.
    ///
    /// With `force` the before-leave listeners are skipped once. Returns
    /// `None` when nothing was blocked.
    ///
    /// # Errors
    ///
    /// Fails like [`navigate`](Self::navigate).
    pub fn retry(&self, force: bool) -> Result<Option<NavigationOutcome>> {
        self.inner.ensure_active()?;
        let Some(intercepted) = self.inner.before_leave.take_intercepted() else {
            return Ok(None);
        };
        debug!(target = %intercepted.target, force, "Retrying navigation");

        match intercepted.target {
            NavigationTarget::Path(path) => {
                let options = intercepted.options.resolve(false);
                self.inner.navigate(&path, options, force).map(Some)
            }
            NavigationTarget::Delta(delta) => {
                if force {
                    self.inner.before_leave.ignore_next();
                }
                self.inner.history.go(delta);
                Ok(Some(NavigationOutcome::Traversed(delta)))
            }
        }
    }

    /// Registers a listener called after every committed location change.
    #[must_use]
    pub fn subscribe(&self, listener: impl Fn(&Location) + 'static) -> Subscription {
        self.inner.listeners.add(Rc::new(listener))
    }

    /// Registers a before-leave listener.
    #[must_use]
    pub fn on_before_leave(
        &self,
        listener: impl Fn(&BeforeLeaveEvent) + 'static,
    ) -> Subscription {
        self.inner.before_leave.subscribe(listener)
    }

    /// Returns `true` while before-leave listeners are being consulted.
    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.inner.before_leave.is_pending()
    }

    /// Returns the current location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.inner.current.borrow().location.clone()
    }

    /// Returns the history depth of the current location.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.current.borrow().depth
    }

    /// Returns the matched routes for the current location.
    #[must_use]
    pub fn current_match(&self) -> Option<BranchMatch> {
        self.inner.current.borrow().matched.clone()
    }

    /// Returns the parameters of the current match.
    #[must_use]
    pub fn params(&self) -> Params {
        self.current_match()
            .map_or_else(Params::new, |m| m.params().clone())
    }

    /// Returns the compiled routes.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.inner.table
    }

    /// Returns the history backend.
    #[must_use]
    pub fn history(&self) -> Rc<dyn History> {
        Rc::clone(&self.inner.history)
    }

    /// Detaches from the history and drops every listener.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        if let Some(subscription) = self.inner.history_subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        self.inner.before_leave.clear();
        self.inner.listeners.clear();
        debug!("Router disposed");
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.inner.current.borrow();
        f.debug_struct("Router")
            .field("base", &self.inner.table.base())
            .field("location", &current.location.value)
            .field("depth", &current.depth)
            .field("disposed", &self.inner.disposed.get())
            .finish_non_exhaustive()
    }
}

impl RouterInner {
    fn ensure_active(&self) -> Result<()> {
        if self.disposed.get() {
            Err(NavError::Disposed)
        } else {
            Ok(())
        }
    }

    /// The path relative targets resolve against: the leaf route's matched
    /// path, or the current pathname when nothing matched.
    fn resolve_from(&self) -> String {
        let current = self.current.borrow();
        current
            .matched
            .as_ref()
            .and_then(|m| m.leaf().map(|leaf| leaf.path.clone()))
            .unwrap_or_else(|| current.location.pathname().to_string())
    }

    /// With `force` the before-leave listeners are not consulted.
    fn navigate(
        &self,
        to: &str,
        options: NavigateOptions,
        force: bool,
    ) -> Result<NavigationOutcome> {
        self.ensure_active()?;
        self.before_leave.cancel_ignore();

        let depth = self.redirects.get();
        if depth >= self.max_redirects {
            warn!(to, limit = self.max_redirects, "Too many redirects");
            *self.redirect_overflow.borrow_mut() = Some(to.to_string());
            return Err(NavError::TooManyRedirects {
                limit: self.max_redirects,
                to: to.to_string(),
            });
        }

        let target = if options.resolve {
            resolve_path(self.table.base(), to, Some(&self.resolve_from()))
        } else if is_external(to) {
            None
        } else {
            Some(to.to_string())
        };
        let Some(target) = target else {
            debug!(to, "External navigation");
            return Ok(NavigationOutcome::External(to.to_string()));
        };

        let from = self.current.borrow().location.clone();
        if target == from.value && options.state == from.state {
            trace!(location = %target, "Navigation unchanged");
            return Ok(NavigationOutcome::Unchanged);
        }

        if force {
            debug!(location = %target, "Before-leave check skipped");
        } else if !self
            .before_leave
            .confirm(NavigationTarget::Path(target.clone()), &options, &from)
        {
            return Ok(NavigationOutcome::Blocked);
        }

        let change = LocationChange {
            value: target,
            replace: options.replace,
            scroll: options.scroll,
            state: options.state,
        };

        self.redirects.set(depth + 1);
        let location = self.commit(change);
        self.redirects.set(depth);

        if depth == 0 {
            if let Some(to) = self.redirect_overflow.borrow_mut().take() {
                return Err(NavError::TooManyRedirects {
                    limit: self.max_redirects,
                    to,
                });
            }
        }
        Ok(NavigationOutcome::Committed(location))
    }

    fn commit(&self, change: LocationChange) -> Location {
        debug!(
            location = %change.value,
            replace = change.replace,
            "Committing navigation"
        );
        self.committing.set(true);
        self.history.set(change);
        self.committing.set(false);
        self.refresh()
    }

    /// Re-reads the history, then notifies location listeners.
    fn refresh(&self) -> Location {
        if self.before_leave.take_intercepted().is_some() {
            trace!("Dropping stale intercepted transition");
        }
        let location = self.history.get();
        let depth = self.history.depth();
        let matched = self.table.match_path(location.pathname());
        if matched.is_none() {
            debug!(location = %location.value, "No route matched");
        }
        *self.current.borrow_mut() = Current {
            location: location.clone(),
            depth,
            matched,
        };
        self.listeners.notify(&location);
        location
    }

    fn handle_history_change(&self) {
        if self.committing.get() || self.disposed.get() {
            return;
        }
        if self.ignore_next_change.replace(false) {
            trace!("Ignoring counter-navigation");
            return;
        }

        let location = self.history.get();
        let new_depth = self.history.depth();
        let (from, prev_depth) = {
            let current = self.current.borrow();
            (current.location.clone(), current.depth)
        };
        let delta = depth_delta(prev_depth, new_depth);

        if delta == 0 {
            self.before_leave.cancel_ignore();
        } else {
            let target = if delta < 0 {
                NavigationTarget::Delta(delta)
            } else {
                NavigationTarget::Path(location.value.clone())
            };
            let options = NavigateOptions {
                state: location.state.clone(),
                ..NavigateOptions::default()
            };
            if !self.before_leave.confirm(target, &options, &from) {
                debug!(delta, "History traversal blocked, restoring position");
                self.ignore_next_change.set(true);
                self.history.go(-delta);
                return;
            }
        }

        self.refresh();
    }
}

/// The signed distance from entry `from` to entry `to`.
fn depth_delta(from: usize, to: usize) -> isize {
    let distance = isize::try_from(from.abs_diff(to)).unwrap_or(isize::MAX);
    if to < from {
        -distance
    } else {
        distance
    }
}
