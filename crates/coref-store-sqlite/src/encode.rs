//! Encoding helpers between core types and the text stored in SQLite columns.
//!
//! Key shapes are stored as compact JSON arrays of field type names.

use coref_core::store::FieldType;

use crate::Result;

pub fn encode_key_schema(key: &[FieldType]) -> Result<String> {
  Ok(serde_json::to_string(key)?)
}

pub fn decode_key_schema(s: &str) -> Result<Vec<FieldType>> {
  Ok(serde_json::from_str(s)?)
}
