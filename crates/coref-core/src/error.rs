//! Error types for `coref-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid coreference value: {0} (expected -1, 0 or 1)")]
  InvalidValue(i64),

  #[error("not a coreference value: {0:?}")]
  UnrecognizedValue(String),

  #[error("epoch ticks {0} outside the storable range")]
  TicksOutOfRange(i64),

  #[error(
    "label not found: ({content_id1}, {content_id2}) \
     subtopics ({subtopic_id1:?}, {subtopic_id2:?}) by {annotator_id}"
  )]
  NotFound {
    content_id1:  String,
    content_id2:  String,
    subtopic_id1: String,
    subtopic_id2: String,
    annotator_id: String,
  },

  /// A stored row could not be decoded back into a label.
  #[error("corrupt row: {0}")]
  CorruptRow(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error without altering it.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
