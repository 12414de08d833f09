//! SQLite backend for the coreference label store.
//!
//! Implements [`coref_core::OrderedStore`] over a single key/value table.
//! Keys are BLOBs, so SQLite's memcmp ordering gives exactly the ascending
//! unsigned-lexicographic scan order the label store relies on.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
