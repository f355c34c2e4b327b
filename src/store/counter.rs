use tracing::trace;

use super::store::{use_store, Store};
use crate::error::Result;
use crate::runtime::Scope;
use crate::signal::{Memo, Signal, WatchGuard};

/// A counter with a derived doubled value.
///
/// `count` starts at 0 and goes negative freely. `double_count` is always
/// twice the current count, including when read from an observer that runs
/// because of the write. Arithmetic wraps at the `i64` bounds.
///
/// # Examples
///
/// ```
/// use tally::{CounterStore, Scope};
///
/// let scope = Scope::new();
/// let counter = scope.use_store::<CounterStore>().unwrap();
///
/// counter.increment();
/// counter.increment();
/// assert_eq!(counter.double_count(), 4);
///
/// counter.reset();
/// counter.decrement();
/// assert_eq!(counter.count(), -1);
/// ```
#[derive(Clone)]
pub struct CounterStore {
    count: Signal<i64>,
    double_count: Memo<i64>,
}

impl Store for CounterStore {
    const ID: &'static str = "counter";

    fn setup(scope: &Scope) -> Self {
        let count = scope.signal(0_i64);
        let double_count = scope.memo({
            let count = count.clone();
            move || count.get().wrapping_mul(2)
        });
        Self {
            count,
            double_count,
        }
    }
}

impl CounterStore {
    pub fn count(&self) -> i64 {
        self.count.get()
    }

    pub fn double_count(&self) -> i64 {
        self.double_count.get()
    }

    pub fn increment(&self) {
        self.count.update(|n| *n = n.wrapping_add(1));
        trace!(store = Self::ID, count = self.count.get_untracked(), "increment");
    }

    pub fn decrement(&self) {
        self.count.update(|n| *n = n.wrapping_sub(1));
        trace!(store = Self::ID, count = self.count.get_untracked(), "decrement");
    }

    /// Set the count back to 0. Observers are notified even when it already
    /// was 0.
    pub fn reset(&self) {
        self.count.set(0);
        trace!(store = Self::ID, "reset");
    }

    /// Call `callback` with the new count after every mutation.
    pub fn subscribe<F>(&self, callback: F) -> WatchGuard
    where
        F: Fn(i64) + 'static,
    {
        self.count.subscribe(callback)
    }
}

impl std::fmt::Debug for CounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterStore")
            .field("count", &self.count.get_untracked())
            .finish()
    }
}

/// Get the counter of the active scope.
pub fn use_counter_store() -> Result<CounterStore> {
    use_store::<CounterStore>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter() -> (Scope, CounterStore) {
        let scope = Scope::new();
        let counter = scope.use_store::<CounterStore>().unwrap();
        (scope, counter)
    }

    #[test]
    fn starts_at_zero() {
        let (_scope, counter) = counter();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.double_count(), 0);
    }

    #[test]
    fn increment_adds_one() {
        let (_scope, counter) = counter();
        counter.increment();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn decrement_goes_negative() {
        let (_scope, counter) = counter();
        counter.decrement();
        assert_eq!(counter.count(), -1);
        assert_eq!(counter.double_count(), -2);
    }

    #[test]
    fn reset_returns_to_zero() {
        let (_scope, counter) = counter();
        counter.increment();
        counter.increment();
        counter.reset();
        assert_eq!(counter.count(), 0);

        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn double_count_is_twice_count() {
        let (_scope, counter) = counter();
        counter.increment();
        assert_eq!(counter.double_count(), 2);
    }

    #[test]
    fn order_matters_around_reset() {
        let (_scope, counter) = counter();
        counter.increment();
        counter.increment();
        counter.reset();
        counter.increment();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn wraps_at_bounds() {
        let (_scope, counter) = counter();
        counter.count.set(i64::MAX);
        counter.increment();
        assert_eq!(counter.count(), i64::MIN);
        assert_eq!(counter.double_count(), i64::MIN.wrapping_mul(2));
    }

    #[test]
    fn subscribers_see_each_mutation() {
        let (_scope, counter) = counter();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _guard = counter.subscribe({
            let seen = Rc::clone(&seen);
            move |count| seen.borrow_mut().push(count)
        });

        counter.reset();
        counter.increment();
        counter.increment();
        counter.decrement();
        counter.reset();
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn use_counter_store_shares_instance() {
        let scope = Scope::new();
        scope.run(|| {
            use_counter_store().unwrap().increment();
            assert_eq!(use_counter_store().unwrap().count(), 1);
        });
    }
}
