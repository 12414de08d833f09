//! An in-process [`OrderedStore`] backed by `BTreeMap`s.
//!
//! Useful for tests and for tools that do not need durability.

use std::{
  collections::{BTreeMap, HashMap},
  sync::RwLock,
};

use thiserror::Error;

use crate::{
  key::KeyRange,
  store::{FieldType, OrderedStore, Row, TableSchema},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("unknown table: {0}")]
  UnknownTable(String),

  #[error("table {table} already registered with key {found:?}, not {expected:?}")]
  SchemaMismatch {
    table:    String,
    expected: Vec<FieldType>,
    found:    Vec<FieldType>,
  },
}

#[derive(Debug)]
struct Table {
  key:  Vec<FieldType>,
  rows: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of physical rows currently held in `table`.
  pub fn row_count(&self, table: &str) -> usize {
    self
      .tables
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .get(table)
      .map_or(0, |t| t.rows.len())
  }
}

impl OrderedStore for MemoryStore {
  type Error = MemoryError;

  async fn setup_namespace(&self, tables: &[TableSchema]) -> Result<(), MemoryError> {
    let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
    for schema in tables {
      match guard.get(&schema.name) {
        Some(existing) if existing.key != schema.key => {
          return Err(MemoryError::SchemaMismatch {
            table:    schema.name.clone(),
            expected: schema.key.clone(),
            found:    existing.key.clone(),
          });
        }
        Some(_) => {}
        None => {
          guard.insert(
            schema.name.clone(),
            Table { key: schema.key.clone(), rows: BTreeMap::new() },
          );
        }
      }
    }
    Ok(())
  }

  async fn put(&self, table: &str, rows: Vec<Row>) -> Result<(), MemoryError> {
    let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
    let t = guard
      .get_mut(table)
      .ok_or_else(|| MemoryError::UnknownTable(table.to_owned()))?;
    for row in rows {
      t.rows.insert(row.key, row.value);
    }
    Ok(())
  }

  async fn scan(&self, table: &str, range: KeyRange) -> Result<Vec<Row>, MemoryError> {
    let guard = self.tables.read().unwrap_or_else(|e| e.into_inner());
    let t = guard
      .get(table)
      .ok_or_else(|| MemoryError::UnknownTable(table.to_owned()))?;
    let rows = t
      .rows
      .range(range.start.clone()..)
      .take_while(|(k, _)| range.contains(k))
      .map(|(k, v)| Row { key: k.clone(), value: v.clone() })
      .collect();
    Ok(rows)
  }

  async fn clear_table(&self, table: &str) -> Result<(), MemoryError> {
    let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
    let t = guard
      .get_mut(table)
      .ok_or_else(|| MemoryError::UnknownTable(table.to_owned()))?;
    t.rows.clear();
    Ok(())
  }
}
