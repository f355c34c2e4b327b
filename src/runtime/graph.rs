use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub(crate) type NodeId = usize;

/// Something that depends on reactive sources.
pub(crate) enum Observer {
    /// A derived value; `dirty` means the cache is stale.
    Memo { dirty: bool },
    /// A callback run on change. When `retrack` is set its dependencies are
    /// rebuilt from the reads it makes on each run.
    Effect { run: Rc<dyn Fn()>, retrack: bool },
}

/// Dependency graph between sources (signals, memos) and observers.
#[derive(Default)]
pub(crate) struct Graph {
    pub(crate) current_observer: Option<NodeId>,
    // source -> observers that read it
    subscribers: HashMap<NodeId, HashSet<NodeId>>,
    // observer -> sources it read
    sources: HashMap<NodeId, HashSet<NodeId>>,
    observers: HashMap<NodeId, Observer>,
}

impl Graph {
    pub(crate) fn insert(&mut self, id: NodeId, observer: Observer) -> Option<Observer> {
        self.observers.insert(id, observer)
    }

    pub(crate) fn link(&mut self, source: NodeId, observer: NodeId) {
        if source == observer {
            return;
        }
        self.subscribers.entry(source).or_default().insert(observer);
        self.sources.entry(observer).or_default().insert(source);
    }

    pub(crate) fn unlink_sources(&mut self, observer: NodeId) {
        if let Some(old) = self.sources.remove(&observer) {
            for source in old {
                if let Some(subs) = self.subscribers.get_mut(&source) {
                    subs.remove(&observer);
                    if subs.is_empty() {
                        self.subscribers.remove(&source);
                    }
                }
            }
        }
    }

    /// Detach an observer entirely. The removed entry is handed back so the
    /// caller can drop it after releasing its borrow of the graph.
    pub(crate) fn remove(&mut self, observer: NodeId) -> Option<Observer> {
        self.unlink_sources(observer);
        if let Some(subs) = self.subscribers.remove(&observer) {
            for sub in subs {
                if let Some(sources) = self.sources.get_mut(&sub) {
                    sources.remove(&observer);
                }
            }
        }
        self.observers.remove(&observer)
    }

    pub(crate) fn effect(&self, id: NodeId) -> Option<(Rc<dyn Fn()>, bool)> {
        match self.observers.get(&id) {
            Some(Observer::Effect { run, retrack }) => Some((Rc::clone(run), *retrack)),
            _ => None,
        }
    }

    pub(crate) fn is_dirty(&self, memo: NodeId) -> bool {
        match self.observers.get(&memo) {
            Some(Observer::Memo { dirty }) => *dirty,
            _ => true,
        }
    }

    pub(crate) fn set_clean(&mut self, memo: NodeId) {
        if let Some(Observer::Memo { dirty }) = self.observers.get_mut(&memo) {
            *dirty = false;
        }
    }

    /// Mark every memo downstream of `source` dirty and return the effects
    /// that have to run, in creation order.
    ///
    /// Memos are walked through even when already dirty: a skipped round can
    /// leave a memo dirty while its observers still have to hear about writes.
    pub(crate) fn invalidate(&mut self, source: NodeId) -> Vec<NodeId> {
        let mut pending: Vec<NodeId> = self.subscribers_of(source);
        let mut visited = HashSet::new();
        let mut effects = HashSet::new();

        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            let is_memo = match self.observers.get_mut(&id) {
                Some(Observer::Memo { dirty }) => {
                    *dirty = true;
                    true
                }
                Some(Observer::Effect { .. }) => {
                    effects.insert(id);
                    false
                }
                None => false,
            };
            if is_memo {
                pending.extend(self.subscribers_of(id));
            }
        }

        let mut effects: Vec<NodeId> = effects.into_iter().collect();
        effects.sort_unstable();
        effects
    }

    pub(crate) fn subscriber_count(&self, source: NodeId) -> usize {
        self.subscribers.get(&source).map_or(0, HashSet::len)
    }

    fn subscribers_of(&self, source: NodeId) -> Vec<NodeId> {
        self.subscribers
            .get(&source)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default()
    }
}
