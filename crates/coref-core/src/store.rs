//! The `OrderedStore` trait: the contract a key-value backend must meet.
//!
//! Backends are implemented elsewhere (e.g. `coref-store-sqlite`, or the
//! in-memory [`MemoryStore`](crate::memory::MemoryStore)). The label store
//! depends only on this abstraction.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::key::KeyRange;

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The type of one field in a table's key tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  Str,
  U64,
}

/// A named table and the shape of its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
  pub name: String,
  pub key:  Vec<FieldType>,
}

impl TableSchema {
  pub fn new(name: impl Into<String>, key: impl Into<Vec<FieldType>>) -> Self {
    Self { name: name.into(), key: key.into() }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One stored row. Keys are produced by [`crate::key::KeyWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  pub key:   Vec<u8>,
  pub value: Vec<u8>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an ordered key-value store.
///
/// Keys compare as unsigned byte strings. Writes are durable once the returned
/// future resolves. Nothing is promised about atomicity across the rows of a
/// single `put`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait OrderedStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Register tables. Registering a known table with the same key shape is a
  /// no-op; a different shape is an error.
  fn setup_namespace<'a>(
    &'a self,
    tables: &'a [TableSchema],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Write rows, replacing any existing rows with identical keys.
  fn put<'a>(
    &'a self,
    table: &'a str,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All rows with keys in `range`, in ascending key order.
  fn scan<'a>(
    &'a self,
    table: &'a str,
    range: KeyRange,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Remove every row of `table`.
  fn clear_table<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
