//! [`SqliteStore`] — the SQLite implementation of [`OrderedStore`].

use std::path::Path;

use coref_core::{
  key::KeyRange,
  store::{OrderedStore, Row, TableSchema},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{decode_key_schema, encode_key_schema},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An ordered key-value store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Look up the registered key shape of `table`, as stored.
fn registered_schema(
  conn: &rusqlite::Connection,
  table: &str,
) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT key_schema FROM namespaces WHERE table_name = ?1",
      rusqlite::params![table],
      |r| r.get(0),
    )
    .optional()
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fail with [`Error::UnknownTable`] unless `table` has been registered.
  async fn require_table(&self, table: &str) -> Result<()> {
    let name = table.to_owned();
    let known = self
      .conn
      .call(move |conn| Ok(registered_schema(conn, &name)?.is_some()))
      .await?;
    if known { Ok(()) } else { Err(Error::UnknownTable(table.to_owned())) }
  }
}

// ─── OrderedStore impl ───────────────────────────────────────────────────────

impl OrderedStore for SqliteStore {
  type Error = Error;

  async fn setup_namespace(&self, tables: &[TableSchema]) -> Result<()> {
    let entries = tables
      .iter()
      .map(|t| Ok((t.name.clone(), encode_key_schema(&t.key)?)))
      .collect::<Result<Vec<_>>>()?;

    // The first conflicting (table, stored schema), if any.
    let conflict: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (name, key_schema) in entries {
          match registered_schema(&tx, &name)? {
            Some(found) if found != key_schema => return Ok(Some((name, found))),
            Some(_) => {}
            None => {
              tx.execute(
                "INSERT INTO namespaces (table_name, key_schema) VALUES (?1, ?2)",
                rusqlite::params![name, key_schema],
              )?;
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    if let Some((table, found)) = conflict {
      let expected = tables
        .iter()
        .find(|t| t.name == table)
        .map(|t| t.key.clone())
        .unwrap_or_default();
      return Err(Error::SchemaMismatch {
        table,
        expected,
        found: decode_key_schema(&found)?,
      });
    }

    tracing::debug!(tables = tables.len(), "namespace ready");
    Ok(())
  }

  async fn put(&self, table: &str, rows: Vec<Row>) -> Result<()> {
    self.require_table(table).await?;
    let name = table.to_owned();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(
            "INSERT OR REPLACE INTO kv_rows (table_name, key, value)
             VALUES (?1, ?2, ?3)",
          )?;
          for row in rows {
            stmt.execute(rusqlite::params![name, row.key, row.value])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn scan(&self, table: &str, range: KeyRange) -> Result<Vec<Row>> {
    self.require_table(table).await?;
    let name = table.to_owned();

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT key, value FROM kv_rows
           WHERE table_name = ?1
             AND key >= ?2
             AND (?3 IS NULL OR key < ?3)
           ORDER BY key ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name, range.start, range.end], |row| {
            Ok(Row { key: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn clear_table(&self, table: &str) -> Result<()> {
    self.require_table(table).await?;
    let name = table.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM kv_rows WHERE table_name = ?1",
          rusqlite::params![name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
