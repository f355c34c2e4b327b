use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::memo::Memo;
use crate::runtime::{NodeId, Observer, ScopeInner};

/// A reactive value that notifies its observers when changed.
///
/// Handles are cheap to clone and all clones share one value.
pub struct Signal<T> {
    value: Rc<RefCell<T>>,
    id: NodeId,
    scope: Weak<ScopeInner>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            id: self.id,
            scope: Weak::clone(&self.scope),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub(crate) fn new(scope: &Rc<ScopeInner>, initial: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial)),
            id: scope.next_id(),
            scope: Rc::downgrade(scope),
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.value.borrow().clone()
    }

    /// Get the current value without registering a dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    /// Update the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.value.borrow_mut());
        self.notify();
    }

    /// Read the value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&*self.value.borrow())
    }

    /// Get the signal's unique ID within its scope.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Call `callback` with the new value after every write.
    pub fn subscribe<F>(&self, callback: F) -> WatchGuard
    where
        T: Clone,
        F: Fn(T) + 'static,
    {
        let Some(scope) = self.scope.upgrade() else {
            return WatchGuard::detached();
        };
        let observer_id = scope.next_id();
        let value = Rc::clone(&self.value);

        scope.register(
            observer_id,
            Observer::Effect {
                run: Rc::new(move || {
                    // Clone first so the callback is free to write this signal.
                    let val = value.borrow().clone();
                    callback(val);
                }),
                retrack: false,
            },
        );
        scope.link(self.id, observer_id);

        WatchGuard {
            observer_id,
            scope: Rc::downgrade(&scope),
        }
    }

    /// Like [`subscribe`](Self::subscribe), but also calls `callback` once
    /// with the current value.
    pub fn watch<F>(&self, callback: F) -> WatchGuard
    where
        T: Clone,
        F: Fn(T) + 'static,
    {
        let callback = Rc::new(callback);
        let guard = self.subscribe({
            let callback = Rc::clone(&callback);
            move |val| callback(val)
        });
        callback(self.get_untracked());
        guard
    }

    /// Derive a memo from this signal.
    pub fn map<U, F>(&self, f: F) -> Memo<U>
    where
        T: Clone,
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        let source = self.clone();
        Memo::from_weak(Weak::clone(&self.scope), move || source.with(&f))
    }

    /// Number of observers currently depending on this signal.
    pub fn observer_count(&self) -> usize {
        self.scope
            .upgrade()
            .map_or(0, |scope| scope.subscriber_count(self.id))
    }

    fn track(&self) {
        if let Some(scope) = self.scope.upgrade() {
            scope.track_read(self.id);
        }
    }

    fn notify(&self) {
        if let Some(scope) = self.scope.upgrade() {
            scope.notify(self.id);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.value.borrow())
            .finish()
    }
}

/// RAII guard for signal watchers.
///
/// Dropping it unsubscribes the callback.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct WatchGuard {
    observer_id: NodeId,
    scope: Weak<ScopeInner>,
}

impl WatchGuard {
    fn detached() -> Self {
        Self {
            observer_id: NodeId::MAX,
            scope: Weak::new(),
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.upgrade() {
            scope.remove_observer(self.observer_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Scope;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn get_set_update() {
        let scope = Scope::new();
        let signal = scope.signal(0);
        assert_eq!(signal.get(), 0);

        signal.set(42);
        assert_eq!(signal.get(), 42);

        signal.update(|n| *n += 10);
        assert_eq!(signal.get(), 52);
        assert_eq!(signal.with(|n| *n * 2), 104);
    }

    #[test]
    fn clones_share_value() {
        let scope = Scope::new();
        let a = scope.signal(String::from("a"));
        let b = a.clone();
        b.set(String::from("b"));
        assert_eq!(a.get(), "b");
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn subscribe_fires_on_every_write() {
        let scope = Scope::new();
        let signal = scope.signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let guard = signal.subscribe({
            let seen = Rc::clone(&seen);
            move |v| seen.borrow_mut().push(v)
        });
        assert!(seen.borrow().is_empty());

        signal.set(1);
        signal.set(1);
        signal.update(|n| *n -= 3);
        assert_eq!(*seen.borrow(), vec![1, 1, -2]);

        drop(guard);
        signal.set(9);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(signal.observer_count(), 0);
    }

    #[test]
    fn watch_calls_immediately() {
        let scope = Scope::new();
        let signal = scope.signal(7);
        let last = Rc::new(Cell::new(0));

        let _guard = signal.watch({
            let last = Rc::clone(&last);
            move |v| last.set(v)
        });
        assert_eq!(last.get(), 7);

        signal.set(8);
        assert_eq!(last.get(), 8);
    }

    #[test]
    fn map_follows_source() {
        let scope = Scope::new();
        let name = scope.signal(String::from("tin"));
        let len = name.map(|s| s.len());
        assert_eq!(len.get(), 3);

        name.set(String::from("tincan"));
        assert_eq!(len.get(), 6);
    }

    #[test]
    fn outlives_disposed_scope() {
        let scope = Scope::new();
        let signal = scope.signal(1);
        drop(scope);

        signal.set(2);
        assert_eq!(signal.get(), 2);
        let _guard = signal.subscribe(|_| {});
        assert_eq!(signal.observer_count(), 0);
    }
}
