//! The store engine: namespaced, cached JSON values on top of a [`Backend`](crate::backend::Backend).
//!
//! Every operation exists in a **persistent** flavour, which goes to the
//! backend the engine was built with, and a **session** flavour, which always
//! goes to the session backend. The two scopes have separate cache partitions.

mod cache;
mod engine;

pub use engine::{StoreEngine, UNDEFINED};

/// Which backend and cache partition an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Persistent,
    Session,
}
