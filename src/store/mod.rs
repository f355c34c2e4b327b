//! Stores: named state containers with one instance per scope.
//!
//! A store bundles signals and memos behind an API of its own. The
//! [`CounterStore`] is the store this crate ships.

mod counter;
mod store;

pub use counter::{use_counter_store, CounterStore};
pub use store::{use_store, Store};
