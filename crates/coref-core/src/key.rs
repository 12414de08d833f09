//! Order-preserving byte encoding for tuple keys.
//!
//! Ordered stores compare keys as unsigned byte strings. The encoding below
//! makes that comparison agree with field-by-field tuple ordering:
//!
//! - strings are written with every `0x00` escaped as `0x00 0xFF` and are
//!   terminated by `0x00 0x01`, so a shorter string sorts before any string
//!   it prefixes;
//! - `u64` fields are written as 8 big-endian bytes.
//!
//! An encoded prefix of fields is a byte prefix of every key that extends it,
//! which is what makes [`KeyRange::prefix`] scans exact.

use crate::{Error, Result};

const ESCAPE: u8 = 0x00;
const ESCAPED_NUL: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Appends tuple fields to an encoded key.
#[derive(Debug, Default, Clone)]
pub struct KeyWriter {
  buf: Vec<u8>,
}

impl KeyWriter {
  pub fn new() -> Self { Self::default() }

  pub fn str(mut self, s: &str) -> Self {
    for &b in s.as_bytes() {
      if b == ESCAPE {
        self.buf.extend_from_slice(&[ESCAPE, ESCAPED_NUL]);
      } else {
        self.buf.push(b);
      }
    }
    self.buf.extend_from_slice(&[ESCAPE, TERMINATOR]);
    self
  }

  pub fn u64(mut self, v: u64) -> Self {
    self.buf.extend_from_slice(&v.to_be_bytes());
    self
  }

  pub fn finish(self) -> Vec<u8> { self.buf }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Reads tuple fields back out of an encoded key, in write order.
#[derive(Debug)]
pub struct KeyReader<'a> {
  rest: &'a [u8],
}

impl<'a> KeyReader<'a> {
  pub fn new(key: &'a [u8]) -> Self { Self { rest: key } }

  pub fn str(&mut self) -> Result<String> {
    let mut out = Vec::new();
    let mut i = 0;
    loop {
      match self.rest.get(i) {
        None => return Err(Error::CorruptRow("unterminated string field".into())),
        Some(&ESCAPE) => match self.rest.get(i + 1) {
          Some(&TERMINATOR) => {
            self.rest = &self.rest[i + 2..];
            break;
          }
          Some(&ESCAPED_NUL) => {
            out.push(ESCAPE);
            i += 2;
          }
          _ => return Err(Error::CorruptRow("bad escape in string field".into())),
        },
        Some(&b) => {
          out.push(b);
          i += 1;
        }
      }
    }
    String::from_utf8(out)
      .map_err(|e| Error::CorruptRow(format!("string field is not utf-8: {e}")))
  }

  pub fn u64(&mut self) -> Result<u64> {
    let Some((head, tail)) = self.rest.split_first_chunk::<8>() else {
      return Err(Error::CorruptRow("truncated integer field".into()));
    };
    self.rest = tail;
    Ok(u64::from_be_bytes(*head))
  }

  /// Fails unless every byte of the key has been consumed.
  pub fn end(self) -> Result<()> {
    if self.rest.is_empty() {
      Ok(())
    } else {
      Err(Error::CorruptRow(format!(
        "{} trailing bytes after last field",
        self.rest.len()
      )))
    }
  }
}

// ─── Ranges ──────────────────────────────────────────────────────────────────

/// A half-open range `[start, end)` over encoded keys. `end == None` means the
/// range is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
  pub start: Vec<u8>,
  pub end:   Option<Vec<u8>>,
}

impl KeyRange {
  /// Every key in the table.
  pub fn all() -> Self { Self { start: Vec::new(), end: None } }

  /// Every key that begins with `prefix`.
  pub fn prefix(prefix: Vec<u8>) -> Self {
    let end = successor(&prefix);
    Self { start: prefix, end }
  }

  pub fn contains(&self, key: &[u8]) -> bool {
    key >= self.start.as_slice()
      && self.end.as_deref().is_none_or(|end| key < end)
  }
}

/// The smallest byte string greater than every string prefixed by `prefix`,
/// or `None` if no such string exists (empty or all-`0xFF` prefix).
fn successor(prefix: &[u8]) -> Option<Vec<u8>> {
  let mut end = prefix.to_vec();
  while let Some(last) = end.pop() {
    if last < u8::MAX {
      end.push(last + 1);
      return Some(end);
    }
  }
  None
}
