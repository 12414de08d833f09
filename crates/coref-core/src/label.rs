//! [`Label`] — the immutable unit of coreference ground truth.
//!
//! A label records that an annotator judged two content items (optionally at
//! the subtopic level) to be coreferent, not coreferent, or undecided, at a
//! point in time. Labels are never updated: a newer label with the same
//! identity supersedes older ones when read back.
//!
//! Identity (equality and hashing) ignores the order of both id pairs as well
//! as the timestamp and value. Ordering follows the physical key layout so
//! that the most recent version of an identity sorts first.

use std::{
  cmp::Ordering,
  hash::{Hash, Hasher},
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  CorefValue, Error, Result,
  key::{KeyRange, KeyReader, KeyWriter},
  store::Row,
};

/// One hundred years of milliseconds.
///
/// Ordered stores can only be trusted to sort unsigned integers, yet labels
/// must sort most recent first. Storing `MAX_TICKS - epoch_ticks` gives that
/// order without a sign flip.
pub const MAX_TICKS: i64 = 100 * 365 * 86_400 * 1000;

/// `MAX_TICKS - t`, the stored form of a timestamp.
pub fn time_complement(t: i64) -> u64 { (MAX_TICKS - t.clamp(0, MAX_TICKS)) as u64 }

/// Orders a pair so the smaller element comes first.
pub fn normalize_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
  if y < x { (y, x) } else { (x, y) }
}

/// `true` iff `{x1, y1} == {x2, y2}` as unordered pairs.
pub fn unordered_pair_eq(
  (x1, y1): (&str, &str),
  (x2, y2): (&str, &str),
) -> bool {
  (x1 == x2 && y1 == y2) || (x1 == y2 && y1 == x2)
}

fn now_ms() -> i64 { Utc::now().timestamp_millis() }

// ─── Label ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Label {
  content_id1:  String,
  content_id2:  String,
  subtopic_id1: String,
  subtopic_id2: String,
  annotator_id: String,
  /// Milliseconds since the Unix epoch.
  epoch_ticks:  i64,
  value:        CorefValue,
}

impl Label {
  /// A label without subtopics, stamped with the current time.
  ///
  /// Clocks past `MAX_TICKS` all store the same complement and tie as most
  /// recent; use [`with_epoch_ticks`](Self::with_epoch_ticks) to reject them.
  pub fn new(
    content_id1: impl Into<String>,
    content_id2: impl Into<String>,
    annotator_id: impl Into<String>,
    value: CorefValue,
  ) -> Self {
    Self {
      content_id1:  content_id1.into(),
      content_id2:  content_id2.into(),
      subtopic_id1: String::new(),
      subtopic_id2: String::new(),
      annotator_id: annotator_id.into(),
      epoch_ticks:  now_ms(),
      value,
    }
  }

  /// Like [`Label::new`], taking the judgment as its raw integer.
  pub fn from_raw(
    content_id1: impl Into<String>,
    content_id2: impl Into<String>,
    annotator_id: impl Into<String>,
    value: i64,
  ) -> Result<Self> {
    Ok(Self::new(
      content_id1,
      content_id2,
      annotator_id,
      CorefValue::try_from(value)?,
    ))
  }

  pub fn with_subtopics(
    mut self,
    subtopic_id1: impl Into<String>,
    subtopic_id2: impl Into<String>,
  ) -> Self {
    self.subtopic_id1 = subtopic_id1.into();
    self.subtopic_id2 = subtopic_id2.into();
    self
  }

  /// Set the creation time. Only `0..=MAX_TICKS` can be stored.
  pub fn with_epoch_ticks(mut self, epoch_ticks: i64) -> Result<Self> {
    if !(0..=MAX_TICKS).contains(&epoch_ticks) {
      return Err(Error::TicksOutOfRange(epoch_ticks));
    }
    self.epoch_ticks = epoch_ticks;
    Ok(self)
  }

  pub fn content_id1(&self) -> &str { &self.content_id1 }

  pub fn content_id2(&self) -> &str { &self.content_id2 }

  pub fn subtopic_id1(&self) -> &str { &self.subtopic_id1 }

  pub fn subtopic_id2(&self) -> &str { &self.subtopic_id2 }

  pub fn annotator_id(&self) -> &str { &self.annotator_id }

  pub fn epoch_ticks(&self) -> i64 { self.epoch_ticks }

  pub fn value(&self) -> CorefValue { self.value }

  /// The creation time as a UTC timestamp.
  pub fn epoch_time(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.epoch_ticks)
  }

  /// The same label with both id pairs swapped. Always equal to `self`.
  pub fn reversed(&self) -> Self {
    Self {
      content_id1:  self.content_id2.clone(),
      content_id2:  self.content_id1.clone(),
      subtopic_id1: self.subtopic_id2.clone(),
      subtopic_id2: self.subtopic_id1.clone(),
      annotator_id: self.annotator_id.clone(),
      epoch_ticks:  self.epoch_ticks,
      value:        self.value,
    }
  }

  /// Whether this is the orientation of the two mirrored rows that full-table
  /// reads decode.
  pub(crate) fn is_canonical(&self) -> bool {
    (self.content_id1.as_str(), self.subtopic_id1.as_str())
      <= (self.content_id2.as_str(), self.subtopic_id2.as_str())
  }

  // ── Ordering ──────────────────────────────────────────────────────────────

  fn sort_key(&self) -> (&str, &str, &str, &str, &str, u64) {
    let (cid1, cid2) = normalize_pair(&self.content_id1, &self.content_id2);
    let (sub1, sub2) = normalize_pair(&self.subtopic_id1, &self.subtopic_id2);
    (
      cid1,
      cid2,
      sub1,
      sub2,
      self.annotator_id.as_str(),
      time_complement(self.epoch_ticks),
    )
  }

  /// Total order matching physical storage order: normalized content pair,
  /// normalized subtopic pair, annotator, then most recent first.
  ///
  /// This is not an `Ord` impl because labels that compare equal as
  /// identities still differ here by timestamp.
  pub fn storage_cmp(&self, other: &Self) -> Ordering {
    self.sort_key().cmp(&other.sort_key())
  }

  // ── Storage encoding ──────────────────────────────────────────────────────

  /// Encode as one physical row. [`LabelStore::put`](crate::LabelStore::put)
  /// also writes the row of [`Label::reversed`].
  pub fn to_storage_row(&self) -> Row {
    let key = KeyWriter::new()
      .str(&self.content_id1)
      .str(&self.content_id2)
      .str(&self.subtopic_id1)
      .str(&self.subtopic_id2)
      .str(&self.annotator_id)
      .u64(time_complement(self.epoch_ticks))
      .finish();
    Row { key, value: self.value.as_i64().to_string().into_bytes() }
  }

  /// Inverse of [`Label::to_storage_row`].
  pub fn from_storage_row(row: &Row) -> Result<Self> {
    let mut r = KeyReader::new(&row.key);
    let content_id1 = r.str()?;
    let content_id2 = r.str()?;
    let subtopic_id1 = r.str()?;
    let subtopic_id2 = r.str()?;
    let annotator_id = r.str()?;
    let complement = r.u64()?;
    r.end()?;

    let epoch_ticks = i64::try_from(complement)
      .ok()
      .filter(|c| *c <= MAX_TICKS)
      .map(|c| MAX_TICKS - c)
      .ok_or_else(|| {
        Error::CorruptRow(format!("time complement {complement} out of range"))
      })?;

    let text = std::str::from_utf8(&row.value)
      .map_err(|e| Error::CorruptRow(format!("value is not utf-8: {e}")))?;
    let raw: i64 = text
      .parse()
      .map_err(|_| Error::CorruptRow(format!("value {text:?} is not an integer")))?;
    let value = CorefValue::try_from(raw)
      .map_err(|e| Error::CorruptRow(e.to_string()))?;

    Ok(Self {
      content_id1,
      content_id2,
      subtopic_id1,
      subtopic_id2,
      annotator_id,
      epoch_ticks,
      value,
    })
  }

  /// Range covering every stored version of one exact row orientation.
  pub fn identity_range(
    content_id1: &str,
    content_id2: &str,
    subtopic_id1: &str,
    subtopic_id2: &str,
    annotator_id: &str,
  ) -> KeyRange {
    KeyRange::prefix(
      KeyWriter::new()
        .str(content_id1)
        .str(content_id2)
        .str(subtopic_id1)
        .str(subtopic_id2)
        .str(annotator_id)
        .finish(),
    )
  }

  /// Range covering every row whose first content id is `content_id`.
  pub fn content_range(content_id: &str) -> KeyRange {
    KeyRange::prefix(KeyWriter::new().str(content_id).finish())
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

impl PartialEq for Label {
  fn eq(&self, other: &Self) -> bool {
    self.annotator_id == other.annotator_id
      && unordered_pair_eq(
        (self.content_id1.as_str(), self.content_id2.as_str()),
        (other.content_id1.as_str(), other.content_id2.as_str()),
      )
      && unordered_pair_eq(
        (self.subtopic_id1.as_str(), self.subtopic_id2.as_str()),
        (other.subtopic_id1.as_str(), other.subtopic_id2.as_str()),
      )
  }
}

impl Eq for Label {}

impl Hash for Label {
  fn hash<H: Hasher>(&self, state: &mut H) {
    let (cid1, cid2) = normalize_pair(&self.content_id1, &self.content_id2);
    let (sub1, sub2) = normalize_pair(&self.subtopic_id1, &self.subtopic_id2);
    self.annotator_id.hash(state);
    cid1.hash(state);
    cid2.hash(state);
    sub1.hash(state);
    sub2.hash(state);
  }
}
