use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::runtime::{NodeId, Observer, ScopeInner};

/// A memoized computed value that automatically tracks dependencies.
///
/// The cached value is dropped as stale whenever a signal or memo it read is
/// written, and recomputed on the next read.
pub struct Memo<T> {
    compute: Rc<dyn Fn() -> T>,
    cached: Rc<RefCell<Option<T>>>,
    id: NodeId,
    scope: Weak<ScopeInner>,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            compute: Rc::clone(&self.compute),
            cached: Rc::clone(&self.cached),
            id: self.id,
            scope: Weak::clone(&self.scope),
        }
    }
}

impl<T: Clone + 'static> Memo<T> {
    pub(crate) fn new<F>(scope: &Rc<ScopeInner>, compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::from_weak(Rc::downgrade(scope), compute)
    }

    pub(crate) fn from_weak<F>(scope: Weak<ScopeInner>, compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let id = match scope.upgrade() {
            Some(scope) => {
                let id = scope.next_id();
                scope.register(id, Observer::Memo { dirty: true });
                id
            }
            None => NodeId::MAX,
        };

        Self {
            compute: Rc::new(compute),
            cached: Rc::new(RefCell::new(None)),
            id,
            scope,
        }
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        let Some(scope) = self.scope.upgrade() else {
            return (self.compute)();
        };

        scope.track_read(self.id);

        if !scope.is_memo_dirty(self.id) {
            if let Some(value) = self.cached.borrow().as_ref() {
                return value.clone();
            }
        }

        // Recompute within observer context to rebuild dependencies
        scope.unlink_sources(self.id);
        let value = scope.with_observer(Some(self.id), || (self.compute)());
        *self.cached.borrow_mut() = Some(value.clone());
        scope.mark_memo_clean(self.id);
        value
    }

    /// Whether the next read will recompute.
    pub fn is_stale(&self) -> bool {
        self.scope
            .upgrade()
            .map_or(true, |scope| scope.is_memo_dirty(self.id))
    }
}

impl<T> Drop for Memo<T> {
    fn drop(&mut self) {
        // Clones share `cached`; only the last one leaves the graph.
        if Rc::strong_count(&self.cached) != 1 {
            return;
        }
        if let Some(scope) = self.scope.upgrade() {
            scope.remove_observer(self.id);
        }
    }
}
