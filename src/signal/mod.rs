//! Fine-grained reactive primitives.
//!
//! This module provides the building blocks stores are made of:
//! - Signals: reactive state containers
//! - Memos: cached derived values
//! - Effects: side effects that react to changes
//!
//! All of them are created through a [`Scope`](crate::Scope).

mod effect;
mod memo;
mod signal;

pub use effect::Effect;
pub use memo::Memo;
pub use signal::{Signal, WatchGuard};
