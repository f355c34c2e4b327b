//! Scopes and the dependency graph behind reactive primitives.
//!
//! A [`Scope`] owns every signal, memo, effect and store created through it
//! and decides when observers run.

mod graph;
mod scope;

pub(crate) use graph::{NodeId, Observer};
pub(crate) use scope::ScopeInner;
pub use scope::Scope;
