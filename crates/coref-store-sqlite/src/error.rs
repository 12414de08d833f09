//! Error type for `coref-store-sqlite`.

use coref_core::store::FieldType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A read or write named a table that was never registered.
  #[error("unknown table: {0}")]
  UnknownTable(String),

  #[error("table {table} already registered with key {found:?}, not {expected:?}")]
  SchemaMismatch {
    table:    String,
    expected: Vec<FieldType>,
    found:    Vec<FieldType>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
