use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::graph::{Graph, NodeId, Observer};
use crate::config::ScopeConfig;
use crate::error::{Error, Result};
use crate::signal::{Effect, Memo, Signal};
use crate::store::Store;

/// State shared by a scope and the primitives created in it.
///
/// Primitives only hold a `Weak` to this, so a scope is torn down as soon as
/// its last `Scope` handle goes away.
pub(crate) struct ScopeInner {
    config: ScopeConfig,
    next_id: Cell<NodeId>,
    graph: RefCell<Graph>,
    stores: RefCell<HashMap<&'static str, Box<dyn Any>>>,
    notify_depth: Cell<usize>,
    disposed: Cell<bool>,
}

impl ScopeInner {
    pub(crate) fn label(&self) -> &str {
        &self.config.label
    }

    pub(crate) fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Record a read of `source` by the current observer, if any.
    pub(crate) fn track_read(&self, source: NodeId) {
        let mut graph = self.graph.borrow_mut();
        if let Some(observer) = graph.current_observer {
            graph.link(source, observer);
        }
    }

    /// Run `f` with `observer` as the current tracking context.
    pub(crate) fn with_observer<R>(&self, observer: Option<NodeId>, f: impl FnOnce() -> R) -> R {
        let prev = std::mem::replace(&mut self.graph.borrow_mut().current_observer, observer);
        let _restore = RestoreObserver {
            graph: &self.graph,
            prev,
        };
        f()
    }

    pub(crate) fn register(&self, id: NodeId, observer: Observer) {
        let replaced = self.graph.borrow_mut().insert(id, observer);
        drop(replaced);
    }

    pub(crate) fn remove_observer(&self, id: NodeId) {
        // The removed closure may own guards that re-enter the graph on drop.
        let removed = match self.graph.try_borrow_mut() {
            Ok(mut graph) => graph.remove(id),
            Err(_) => return,
        };
        drop(removed);
    }

    pub(crate) fn unlink_sources(&self, observer: NodeId) {
        self.graph.borrow_mut().unlink_sources(observer);
    }

    pub(crate) fn link(&self, source: NodeId, observer: NodeId) {
        self.graph.borrow_mut().link(source, observer);
    }

    pub(crate) fn is_memo_dirty(&self, memo: NodeId) -> bool {
        self.graph.borrow().is_dirty(memo)
    }

    pub(crate) fn mark_memo_clean(&self, memo: NodeId) {
        self.graph.borrow_mut().set_clean(memo);
    }

    pub(crate) fn subscriber_count(&self, source: NodeId) -> usize {
        self.graph.borrow().subscriber_count(source)
    }

    /// Invalidate everything downstream of `source` and run the affected
    /// effects before returning.
    pub(crate) fn notify(&self, source: NodeId) {
        if self.disposed.get() {
            return;
        }

        let effects = self.graph.borrow_mut().invalidate(source);
        if effects.is_empty() {
            return;
        }

        let depth = self.notify_depth.get();
        if depth >= self.config.max_notify_depth {
            warn!(
                scope = %self.config.label,
                source,
                depth,
                skipped = effects.len(),
                "notification depth limit reached, skipping nested round"
            );
            return;
        }

        trace!(scope = %self.config.label, source, observers = effects.len(), "notifying observers");
        self.notify_depth.set(depth + 1);
        let _restore = RestoreDepth {
            depth: &self.notify_depth,
            prev: depth,
        };
        for id in effects {
            self.run_effect(id);
        }
    }

    pub(crate) fn run_effect(&self, id: NodeId) {
        let Some((run, retrack)) = self.graph.borrow().effect(id) else {
            return;
        };
        if retrack {
            self.unlink_sources(id);
            self.with_observer(Some(id), || run());
        } else {
            self.with_observer(None, || run());
        }
    }
}

struct RestoreObserver<'a> {
    graph: &'a RefCell<Graph>,
    prev: Option<NodeId>,
}

impl Drop for RestoreObserver<'_> {
    fn drop(&mut self) {
        if let Ok(mut graph) = self.graph.try_borrow_mut() {
            graph.current_observer = self.prev;
        }
    }
}

struct RestoreDepth<'a> {
    depth: &'a Cell<usize>,
    prev: usize,
}

impl Drop for RestoreDepth<'_> {
    fn drop(&mut self) {
        self.depth.set(self.prev);
    }
}

/// Lifecycle boundary for reactive primitives and store instances.
///
/// Every signal, memo, effect and store belongs to exactly one scope. Stores
/// are created once per scope and shared by everyone using that scope; a new
/// scope starts from scratch. There is no global fallback: a scope has to be
/// created and activated explicitly.
///
/// # Examples
///
/// ```
/// use tally::{CounterStore, Scope};
///
/// Scope::isolated(|scope| {
///     let counter = scope.use_store::<CounterStore>().unwrap();
///     counter.increment();
///     assert_eq!(counter.double_count(), 2);
/// });
/// // The scope and its counter are gone here
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

// Stack of active scopes for the current thread
thread_local! {
    static SCOPE_STACK: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

impl Scope {
    /// Create a scope with the default config.
    pub fn new() -> Self {
        Self::from_config(ScopeConfig::default())
    }

    /// Create a scope with a validated config.
    pub fn with_config(config: ScopeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: ScopeConfig) -> Self {
        debug!(scope = %config.label, "scope created");
        Self {
            inner: Rc::new(ScopeInner {
                config,
                next_id: Cell::new(0),
                graph: RefCell::new(Graph::default()),
                stores: RefCell::new(HashMap::new()),
                notify_depth: Cell::new(0),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Run a function inside a fresh scope and dispose it afterwards.
    ///
    /// Useful for tests: each call gets its own stores, nothing leaks
    /// between calls.
    pub fn isolated<F, R>(f: F) -> R
    where
        F: FnOnce(&Scope) -> R,
    {
        let scope = Self::new();
        let result = scope.run(|| f(&scope));
        scope.dispose();
        result
    }

    /// Run a function with this scope as the active one.
    ///
    /// The scope is pushed onto the thread-local stack for the duration of
    /// `f` and popped again afterwards, also when `f` panics.
    pub fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(self.clone());
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// The innermost active scope on this thread.
    pub fn current() -> Result<Self> {
        SCOPE_STACK.with(|stack| stack.borrow().last().cloned().ok_or(Error::NoActiveScope))
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.inner.config
    }

    pub fn label(&self) -> &str {
        self.inner.label()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Tear the scope down.
    ///
    /// Drops every registered store and observer. Signals created here keep
    /// their values but stop notifying, and [`use_store`](Self::use_store)
    /// fails from now on.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        // Take both out first: dropping observers can re-enter the graph.
        let graph = std::mem::take(&mut *self.inner.graph.borrow_mut());
        let stores = std::mem::take(&mut *self.inner.stores.borrow_mut());
        debug!(scope = %self.inner.config.label, stores = stores.len(), "scope disposed");
        drop(stores);
        drop(graph);
    }

    /// Create a signal owned by this scope.
    pub fn signal<T: 'static>(&self, initial: T) -> Signal<T> {
        Signal::new(&self.inner, initial)
    }

    /// Create a memo owned by this scope.
    pub fn memo<T, F>(&self, compute: F) -> Memo<T>
    where
        T: Clone + 'static,
        F: Fn() -> T + 'static,
    {
        Memo::new(&self.inner, compute)
    }

    /// Create an effect owned by this scope; it runs once immediately.
    pub fn effect<F>(&self, f: F) -> Effect
    where
        F: Fn() + 'static,
    {
        Effect::new(&self.inner, f)
    }

    /// Run `f` without recording any reads as dependencies.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.with_observer(None, f)
    }

    /// Get this scope's instance of `S`, setting it up on first use.
    pub fn use_store<S: Store>(&self) -> Result<S> {
        if self.is_disposed() {
            return Err(Error::ScopeDisposed(self.label().to_string()));
        }
        if let Some(existing) = self.lookup::<S>()? {
            return Ok(existing);
        }

        // Setup may use other stores, so the registry is not borrowed here.
        let store = S::setup(self);

        let mut stores = self.inner.stores.borrow_mut();
        if let Some(entry) = stores.get(S::ID) {
            return entry
                .downcast_ref::<S>()
                .cloned()
                .ok_or(Error::StoreTypeMismatch { id: S::ID });
        }
        stores.insert(S::ID, Box::new(store.clone()));
        debug!(scope = %self.inner.config.label, store = S::ID, "store created");
        Ok(store)
    }

    pub fn contains_store(&self, id: &str) -> bool {
        self.inner.stores.borrow().contains_key(id)
    }

    fn lookup<S: Store>(&self) -> Result<Option<S>> {
        let stores = self.inner.stores.borrow();
        match stores.get(S::ID) {
            None => Ok(None),
            Some(entry) => entry
                .downcast_ref::<S>()
                .cloned()
                .map(Some)
                .ok_or(Error::StoreTypeMismatch { id: S::ID }),
        }
    }

    /// Check whether two handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("label", &self.inner.config.label)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
