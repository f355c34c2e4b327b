//! Error types for scope and store lifecycle misuse.

use thiserror::Error;

/// Errors reported by [`Scope`](crate::Scope) and the store registry.
///
/// Counter operations themselves never fail; these cover the lifecycle
/// mistakes the crate can detect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No scope is active on the current thread.
    #[error("no active scope on this thread")]
    NoActiveScope,

    /// The scope was disposed before the call.
    #[error("scope `{0}` has been disposed")]
    ScopeDisposed(String),

    /// Two different store types were registered under one ID.
    #[error("store id `{id}` is already registered with a different type")]
    StoreTypeMismatch {
        /// The conflicting store ID
        id: &'static str,
    },

    /// Rejected scope configuration
    #[error("invalid scope config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for scope and store operations
pub type Result<T> = std::result::Result<T, Error>;
