//! Native key/value storage areas.
//!
//! This module defines the [`StorageArea`] trait, the Rust counterpart of the
//! DOM `Storage` interface, and the areas a [`Host`](crate::host::Host) can
//! offer as its durable (`localStorage`) and session (`sessionStorage`)
//! mechanism.
//!
//! # Available types
//!
//! - [`StorageArea`]: Trait for any storage area.
//! - [`MemoryArea`]: In-memory area, nothing survives the process.
//! - [`DisabledArea`]: Area that refuses every write, like storage in some
//!   private browsing modes.
//! - [`SqliteStorage`]: SQLite database holding any number of named areas
//!   (`sqlite` feature).
//! - [`WebStorageArea`]: `window.localStorage` / `window.sessionStorage`
//!   (`web` feature, `wasm32` only).
//!
//! # Choosing an area
//!
//! - For durable storage on native hosts, use [`SqliteStorage`].
//! - For session storage, use [`MemoryArea`].
//! - For testing, you can use in-memory for both.

/// Storage area trait.
pub mod area;
/// In-memory and disabled areas.
pub mod memory;
/// SQLite-backed areas.
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
/// Browser `Storage` areas.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use area::StorageArea;
pub use memory::{DisabledArea, MemoryArea};
#[cfg(feature = "sqlite")]
pub use sqlite_store::{SqliteArea, SqliteStorage};
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::WebStorageArea;
