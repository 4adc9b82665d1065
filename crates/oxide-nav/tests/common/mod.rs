#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use oxide_nav::history::{BrowserHistory, NativeHistory};
use oxide_nav::{Router, RouterConfig};
use serde_json::Value;

/// A platform session history. Traversals complete only when the test
/// calls [`flush`], like `popstate` events arriving on a later tick.
#[derive(Debug)]
pub struct FakeSession {
    entries: RefCell<Vec<(String, Option<Value>)>>,
    index: Cell<usize>,
    pending_pops: Cell<usize>,
}

impl FakeSession {
    pub fn at(url: &str) -> Self {
        Self {
            entries: RefCell::new(vec![(url.to_string(), None)]),
            index: Cell::new(0),
            pending_pops: Cell::new(0),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub fn raw_state(&self) -> Option<Value> {
        self.state()
    }
}

impl NativeHistory for FakeSession {
    fn url(&self) -> String {
        self.entries.borrow()[self.index.get()].0.clone()
    }

    fn state(&self) -> Option<Value> {
        self.entries.borrow()[self.index.get()].1.clone()
    }

    fn length(&self) -> usize {
        self.entries.borrow().len()
    }

    fn push_state(&self, state: Option<Value>, url: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push((url.to_string(), state));
        self.index.set(entries.len() - 1);
    }

    fn replace_state(&self, state: Option<Value>, url: &str) {
        self.entries.borrow_mut()[self.index.get()] = (url.to_string(), state);
    }

    fn go(&self, delta: isize) {
        let last = self.entries.borrow().len() - 1;
        let target = self.index.get().saturating_add_signed(delta).min(last);
        if target != self.index.get() {
            self.index.set(target);
            self.pending_pops.set(self.pending_pops.get() + 1);
        }
    }
}

/// Delivers queued `popstate` events, including ones queued while handling.
pub fn flush(history: &BrowserHistory<FakeSession>) {
    while history.native().pending_pops.get() > 0 {
        history
            .native()
            .pending_pops
            .set(history.native().pending_pops.get() - 1);
        history.handle_popstate();
    }
}

pub const ROUTES: &str = r#"{
    "routes": [
        { "path": "/", "name": "home" },
        { "path": "/users/:id", "name": "user", "filters": { "id": { "regex": "^\\d+$" } } },
        { "path": "/users/:id/edit", "name": "edit" },
        { "path": "/*all", "name": "not_found" }
    ]
}"#;

pub fn config() -> RouterConfig {
    RouterConfig::from_json_str(ROUTES).unwrap_or_else(|e| panic!("Invalid routes: {e}"))
}

pub fn browser_router(url: &str) -> (Rc<BrowserHistory<FakeSession>>, Router) {
    let history = Rc::new(BrowserHistory::new(FakeSession::at(url)));
    let router = Router::new(history.clone(), &config())
        .unwrap_or_else(|e| panic!("Failed to build router: {e}"));
    (history, router)
}
