//! Keyed reactive state shared by everything rendered inside one surface.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

use serde_json::Value;
use tracing::trace;

type Callback = Rc<dyn Fn(&[Option<Value>])>;

struct Subscription {
    id: u64,
    keys: Vec<String>,
    callback: Callback,
    active: Rc<Cell<bool>>,
}

#[derive(Default)]
struct StoreState {
    values: HashMap<String, Value>,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

/// Last-write-wins key/value store with synchronous subscriber notification.
///
/// Cloning yields another handle to the same store. Callbacks are invoked
/// with no internal borrow held, so they may read or write the store.
#[derive(Clone, Default)]
pub struct Store {
    state: Rc<RefCell<StoreState>>,
}

/// Removes a subscription when cancelled. Dropping the handle keeps it alive.
pub struct SubscriptionHandle {
    state: Weak<RefCell<StoreState>>,
    id: u64,
    active: Rc<Cell<bool>>,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        self.active.set(false);
        if let Some(state) = self.state.upgrade() {
            state
                .borrow_mut()
                .subscriptions
                .retain(|sub| sub.id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current values for `keys`, in order. Absent keys read as `None`.
    pub fn get<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Option<Value>> {
        let state = self.state.borrow();
        keys.iter()
            .map(|key| state.values.get(key.as_ref()).cloned())
            .collect()
    }

    pub fn get_one(&self, key: &str) -> Option<Value> {
        self.state.borrow().values.get(key).cloned()
    }

    /// Writes every entry, then notifies each subscription watching any
    /// written key with a fresh read of all its keys, in registration order.
    pub fn set<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let written: Vec<String> = {
            let mut state = self.state.borrow_mut();
            entries
                .into_iter()
                .map(|(key, value)| {
                    let key = key.into();
                    state.values.insert(key.clone(), value);
                    key
                })
                .collect()
        };
        if written.is_empty() {
            return;
        }
        trace!(keys = ?written, "store write");

        let targets: Vec<(Vec<String>, Callback, Rc<Cell<bool>>)> = self
            .state
            .borrow()
            .subscriptions
            .iter()
            .filter(|sub| sub.keys.iter().any(|key| written.contains(key)))
            .map(|sub| (sub.keys.clone(), sub.callback.clone(), sub.active.clone()))
            .collect();

        for (keys, callback, active) in targets {
            // a callback earlier in this round may have cancelled a later one
            if !active.get() {
                continue;
            }
            let values = self.get(&keys);
            callback(&values);
        }
    }

    pub fn set_one(&self, key: &str, value: Value) {
        self.set([(key, value)]);
    }

    /// Registers `callback` for `keys` and invokes it once with the current values.
    pub fn subscribe<K, F>(&self, keys: &[K], callback: F) -> SubscriptionHandle
    where
        K: AsRef<str>,
        F: Fn(&[Option<Value>]) + 'static,
    {
        let keys: Vec<String> = keys.iter().map(|key| key.as_ref().to_string()).collect();
        let callback: Callback = Rc::new(callback);
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.subscriptions.push(Subscription {
                id,
                keys: keys.clone(),
                callback: callback.clone(),
                active: active.clone(),
            });
            id
        };

        let values = self.get(&keys);
        callback(&values);

        SubscriptionHandle {
            state: Rc::downgrade(&self.state),
            id,
            active,
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
