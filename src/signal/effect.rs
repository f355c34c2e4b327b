use std::rc::{Rc, Weak};

use crate::runtime::{NodeId, Observer, ScopeInner};

/// A side effect that runs when its dependencies change.
///
/// Effects track the signals and memos they read and re-run when any of
/// those change, rebuilding their dependencies on every run. The effect runs
/// once on creation. Dropping the handle removes it.
///
/// # Examples
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use tally::Scope;
///
/// let scope = Scope::new();
/// let count = scope.signal(0);
/// let runs = Rc::new(Cell::new(0));
///
/// let _effect = scope.effect({
///     let count = count.clone();
///     let runs = Rc::clone(&runs);
///     move || {
///         let _ = count.get();
///         runs.set(runs.get() + 1);
///     }
/// });
/// assert_eq!(runs.get(), 1);
///
/// count.set(1);
/// assert_eq!(runs.get(), 2);
/// ```
#[must_use = "dropping the effect removes it immediately"]
pub struct Effect {
    id: NodeId,
    scope: Weak<ScopeInner>,
}

impl Effect {
    pub(crate) fn new<F>(scope: &Rc<ScopeInner>, effect: F) -> Self
    where
        F: Fn() + 'static,
    {
        let id = scope.next_id();
        scope.register(
            id,
            Observer::Effect {
                run: Rc::new(effect),
                retrack: true,
            },
        );

        // Run immediately within the observer context to track dependencies
        scope.run_effect(id);

        Self {
            id,
            scope: Rc::downgrade(scope),
        }
    }

    /// Manually trigger the effect.
    pub fn run(&self) {
        if let Some(scope) = self.scope.upgrade() {
            scope.run_effect(self.id);
        }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if let Some(scope) = self.scope.upgrade() {
            scope.remove_observer(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Scope;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn effect_runs_immediately() {
        let scope = Scope::new();
        let counter = Rc::new(Cell::new(0));

        let _effect = scope.effect({
            let counter = Rc::clone(&counter);
            move || counter.set(counter.get() + 1)
        });

        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn sees_fresh_memo_values() {
        let scope = Scope::new();
        let count = scope.signal(1);
        let doubled = scope.memo({
            let count = count.clone();
            move || count.get() * 2
        });
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _effect = scope.effect({
            let (count, doubled, seen) = (count.clone(), doubled.clone(), Rc::clone(&seen));
            move || seen.borrow_mut().push((count.get(), doubled.get()))
        });

        count.set(3);
        count.set(-2);
        assert_eq!(*seen.borrow(), vec![(1, 2), (3, 6), (-2, -4)]);
    }

    #[test]
    fn dropped_effect_stops_running() {
        let scope = Scope::new();
        let signal = scope.signal(0);
        let runs = Rc::new(Cell::new(0));

        let effect = scope.effect({
            let (signal, runs) = (signal.clone(), Rc::clone(&runs));
            move || {
                let _ = signal.get();
                runs.set(runs.get() + 1);
            }
        });
        signal.set(1);
        assert_eq!(runs.get(), 2);

        effect.run();
        assert_eq!(runs.get(), 3);

        drop(effect);
        signal.set(2);
        assert_eq!(runs.get(), 3);
    }
}
