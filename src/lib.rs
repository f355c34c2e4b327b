//! # Tally
//!
//! A scoped reactive counter store for Rust.
//!
//! Tally is organised in three layers:
//!
//! ## Scopes
//!
//! A [`Scope`] is the lifecycle boundary for everything else. Stores are
//! created once per scope and shared by all consumers inside it; a fresh
//! scope means fresh state, which keeps tests and independent app instances
//! apart. There is no implicit global scope.
//!
//! ## Signals (low-level primitives)
//!
//! - `Signal<T>` - reactive values that notify dependents when changed
//! - `Memo<T>` - cached derived values that track their dependencies
//! - `Effect` - side effects that re-run when dependencies change
//!
//! ## Stores (high-level state)
//!
//! - [`Store`] - a named state container, one instance per scope
//! - [`CounterStore`] - an integer with `increment`, `decrement`, `reset`
//!   and a derived `double_count`
//!
//! Everything is single-threaded and synchronous: observers run before the
//! write that triggered them returns.

pub mod config;
pub mod error;
pub mod runtime;
pub mod signal;
pub mod store;

// Re-export main types for convenience
pub use config::ScopeConfig;
pub use error::{Error, Result};
pub use runtime::Scope;
pub use signal::{Effect, Memo, Signal, WatchGuard};
pub use store::{use_counter_store, use_store, CounterStore, Store};
