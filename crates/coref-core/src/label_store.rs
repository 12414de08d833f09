//! [`LabelStore`] — put, get, scan and connected-component queries over any
//! [`OrderedStore`].
//!
//! Every label is written twice: once as given and once reversed, so that a
//! prefix scan on either content id finds it. Superseded versions are never
//! deleted; reads reduce them away with [`latest_labels`].
//!
//! Keys hold subtopics in the order given, so two versions of one identity can
//! sit apart in the table. Reads sort by [`Label::storage_cmp`] before reducing.

use std::collections::{BTreeSet, HashSet};

use crate::{
  CorefValue, Error, Label, Result,
  key::KeyRange,
  store::{FieldType, OrderedStore, TableSchema},
};

/// Name of the single logical table holding labels.
pub const LABEL_TABLE: &str = "label";

/// `(cid1, cid2, subid1, subid2, annotator_id, MAX_TICKS - epoch_ticks)`.
pub fn label_schema() -> TableSchema {
  TableSchema::new(
    LABEL_TABLE,
    [
      FieldType::Str,
      FieldType::Str,
      FieldType::Str,
      FieldType::Str,
      FieldType::Str,
      FieldType::U64,
    ],
  )
}

// ─── Latest-wins reduction ───────────────────────────────────────────────────

/// Iterator adapter returned by [`latest_labels`].
#[derive(Debug, Clone)]
pub struct LatestLabels<I> {
  inner: I,
  last:  Option<Label>,
}

/// Keep only the first label of every run of equal labels.
///
/// The input must already be in storage order, where all versions of one
/// identity are adjacent and the most recent comes first. No sorting happens
/// here.
pub fn latest_labels<I>(labels: I) -> LatestLabels<I::IntoIter>
where
  I: IntoIterator<Item = Label>,
{
  LatestLabels { inner: labels.into_iter(), last: None }
}

impl<I: Iterator<Item = Label>> Iterator for LatestLabels<I> {
  type Item = Label;

  fn next(&mut self) -> Option<Label> {
    for label in self.inner.by_ref() {
      if self.last.as_ref() == Some(&label) {
        continue;
      }
      self.last = Some(label.clone());
      return Some(label);
    }
    None
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A label database layered over an ordered key-value store.
#[derive(Debug, Clone)]
pub struct LabelStore<S> {
  store: S,
}

impl<S: OrderedStore> LabelStore<S> {
  /// Wrap `store`, registering the label table with it.
  pub async fn new(store: S) -> Result<Self> {
    store
      .setup_namespace(&[label_schema()])
      .await
      .map_err(Error::store)?;
    Ok(Self { store })
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn into_inner(self) -> S { self.store }

  async fn scan(&self, range: KeyRange) -> Result<Vec<Label>> {
    self
      .store
      .scan(LABEL_TABLE, range)
      .await
      .map_err(Error::store)?
      .iter()
      .map(Label::from_storage_row)
      .collect()
  }

  /// Persist `label` as two rows: as given and reversed.
  pub async fn put(&self, label: &Label) -> Result<()> {
    tracing::info!(?label, "adding label");
    let rows = vec![label.to_storage_row(), label.reversed().to_storage_row()];
    self.store.put(LABEL_TABLE, rows).await.map_err(Error::store)
  }

  /// The most recent label stored under exactly this orientation of ids.
  ///
  /// Ids are matched against the stored key, not as unordered pairs. Because
  /// [`put`](Self::put) also writes the reversed row, asking for `(b, a)` finds
  /// a label put as `(a, b)` as long as the subtopics are swapped too.
  pub async fn get(
    &self,
    content_id1: &str,
    content_id2: &str,
    annotator_id: &str,
    subtopic_id1: &str,
    subtopic_id2: &str,
  ) -> Result<Label> {
    let range = Label::identity_range(
      content_id1,
      content_id2,
      subtopic_id1,
      subtopic_id2,
      annotator_id,
    );
    self
      .scan(range)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| Error::NotFound {
        content_id1:  content_id1.to_owned(),
        content_id2:  content_id2.to_owned(),
        subtopic_id1: subtopic_id1.to_owned(),
        subtopic_id2: subtopic_id2.to_owned(),
        annotator_id: annotator_id.to_owned(),
      })
  }

  /// The current label of every identity directly touching `content_id`.
  ///
  /// Transitive relationships are not followed; see
  /// [`connected_component`](Self::connected_component).
  pub async fn get_all_for_content_id(
    &self,
    content_id: &str,
  ) -> Result<LatestLabels<std::vec::IntoIter<Label>>> {
    let mut labels = self.scan(Label::content_range(content_id)).await?;
    labels.sort_by(Label::storage_cmp);
    Ok(latest_labels(labels))
  }

  /// Every label reachable from `content_id` by following edges whose
  /// current value is `value`.
  ///
  /// If `(a, b, +1)` and `(b, c, +1)` are stored, the positive component of
  /// `a` holds both labels even though `a` and `c` are not directly linked.
  /// Each identity appears once; output is in storage order.
  pub async fn connected_component(
    &self,
    content_id: &str,
    value: CorefValue,
  ) -> Result<Vec<Label>> {
    let mut done: HashSet<String> = HashSet::new();
    let mut todo: BTreeSet<String> = BTreeSet::from([content_id.to_owned()]);
    let mut labels: HashSet<Label> = HashSet::new();

    while let Some(cid) = todo.pop_first() {
      let direct = self.get_all_for_content_id(&cid).await?;
      done.insert(cid);
      for label in direct {
        if label.value() != value {
          continue;
        }
        for end in [label.content_id1(), label.content_id2()] {
          if !done.contains(end) {
            todo.insert(end.to_owned());
          }
        }
        labels.insert(label);
      }
    }

    tracing::debug!(
      content_id,
      %value,
      visited = done.len(),
      labels = labels.len(),
      "connected component resolved"
    );

    let mut labels: Vec<Label> = labels.into_iter().collect();
    labels.sort_by(Label::storage_cmp);
    Ok(labels)
  }

  /// Every label in the store.
  ///
  /// With `include_deleted`, superseded versions are returned as well, most
  /// recent first within each identity. Otherwise only current versions are.
  pub async fn everything(
    &self,
    include_deleted: bool,
  ) -> Result<Box<dyn Iterator<Item = Label> + Send>> {
    let mut labels: Vec<Label> = self
      .scan(KeyRange::all())
      .await?
      .into_iter()
      .filter(Label::is_canonical)
      .collect();
    labels.sort_by(Label::storage_cmp);
    if include_deleted {
      Ok(Box::new(labels.into_iter()))
    } else {
      Ok(Box::new(latest_labels(labels)))
    }
  }

  /// Remove every label, including history. Irreversible.
  pub async fn delete_all(&self) -> Result<()> {
    tracing::warn!("clearing label table");
    self.store.clear_table(LABEL_TABLE).await.map_err(Error::store)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  const T: i64 = 1_234_567_890_000;

  fn lab(cid1: &str, cid2: &str, v: i64) -> Label {
    Label::from_raw(cid1, cid2, "", v)
      .unwrap()
      .with_epoch_ticks(T)
      .unwrap()
  }

  async fn store() -> LabelStore<MemoryStore> {
    LabelStore::new(MemoryStore::new()).await.expect("memory store")
  }

  async fn put_all(s: &LabelStore<MemoryStore>, labels: &[&Label]) {
    for l in labels {
      s.put(l).await.unwrap();
    }
  }

  fn as_set(labels: Vec<Label>) -> HashSet<Label> { labels.into_iter().collect() }

  // ─── latest_labels ─────────────────────────────────────────────────────────

  #[test]
  fn latest_labels_keeps_first_of_each_run() {
    let new = lab("a", "b", 1).with_epoch_ticks(T + 1).unwrap();
    let old = lab("b", "a", -1);
    let other = lab("a", "c", 1);
    let out: Vec<Label> =
      latest_labels(vec![new.clone(), old, other.clone()]).collect();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].epoch_ticks(), T + 1);
    assert_eq!(out[1], other);
  }

  #[test]
  fn latest_labels_of_empty_is_empty() {
    assert_eq!(latest_labels(Vec::new()).count(), 0);
  }

  // ─── put / get ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn put_writes_two_rows() {
    let s = store().await;
    s.put(&lab("a", "b", 1)).await.unwrap();
    assert_eq!(s.store().row_count(LABEL_TABLE), 2);
  }

  #[tokio::test]
  async fn get_returns_stored_label() {
    let s = store().await;
    let l = lab("a", "b", 1);
    s.put(&l).await.unwrap();

    let got = s.get("a", "b", "", "", "").await.unwrap();
    assert_eq!(got, l);
    assert_eq!(got.value(), CorefValue::Positive);
    assert_eq!(got.epoch_ticks(), T);
  }

  #[tokio::test]
  async fn get_finds_reversed_orientation() {
    let s = store().await;
    let l = lab("a", "b", -1).with_subtopics("s1", "s2");
    s.put(&l).await.unwrap();

    let got = s.get("b", "a", "", "s2", "s1").await.unwrap();
    assert_eq!(got, l);
    assert_eq!(got.content_id1(), "b");
    assert_eq!(got.value(), CorefValue::Negative);
  }

  #[tokio::test]
  async fn get_returns_most_recent_version() {
    let s = store().await;
    let l1 = lab("a", "b", 1);
    let l2 = lab("b", "a", -1).with_epoch_ticks(T + 1).unwrap();
    put_all(&s, &[&l1, &l2]).await;

    let got = s.get("a", "b", "", "", "").await.unwrap();
    assert_eq!(got.value(), CorefValue::Negative);
    assert_eq!(got.epoch_ticks(), T + 1);
  }

  #[tokio::test]
  async fn get_missing_is_not_found() {
    let s = store().await;
    s.put(&lab("a", "b", 1)).await.unwrap();

    let err = s.get("a", "b", "someone", "", "").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { ref annotator_id, .. } if annotator_id == "someone"));

    let err = s.get("a", "b", "", "s1", "").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
  }

  #[tokio::test]
  async fn get_does_not_match_longer_ids() {
    let s = store().await;
    s.put(&lab("ab", "c", 1)).await.unwrap();
    assert!(s.get("a", "c", "", "", "").await.is_err());
  }

  // ─── get_all_for_content_id ────────────────────────────────────────────────

  #[tokio::test]
  async fn direct_connections() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ac = lab("a", "c", 1);
    let bc = lab("b", "c", 1);
    put_all(&s, &[&ab, &ac, &bc]).await;

    let direct: Vec<Label> = s.get_all_for_content_id("a").await.unwrap().collect();
    assert_eq!(direct, vec![ab, ac]);
  }

  #[tokio::test]
  async fn direct_connections_unordered() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ca = lab("c", "a", 1);
    let bc = lab("b", "c", 1);
    put_all(&s, &[&ab, &ca, &bc]).await;

    let direct: Vec<Label> = s.get_all_for_content_id("a").await.unwrap().collect();
    assert_eq!(direct, vec![ab, ca]);
  }

  #[tokio::test]
  async fn direct_connections_keep_latest_only() {
    let s = store().await;
    let l1 = lab("a", "b", 1);
    let l2 = lab("b", "a", -1).with_epoch_ticks(T + 1).unwrap();
    let l3 = lab("a", "b", 0).with_epoch_ticks(T + 2).unwrap();
    put_all(&s, &[&l1, &l2, &l3]).await;

    for cid in ["a", "b"] {
      let direct: Vec<Label> = s.get_all_for_content_id(cid).await.unwrap().collect();
      assert_eq!(direct.len(), 1);
      assert_eq!(direct[0].value(), CorefValue::Unknown);
      assert_eq!(direct[0].epoch_ticks(), T + 2);
    }
  }

  #[tokio::test]
  async fn swapped_subtopics_are_superseded() {
    let s = store().await;
    let old = lab("a", "b", 1).with_subtopics("x", "y");
    let new = lab("a", "b", -1)
      .with_subtopics("y", "x")
      .with_epoch_ticks(T + 1000)
      .unwrap();
    assert_eq!(old, new);
    put_all(&s, &[&old, &new]).await;

    for cid in ["a", "b"] {
      let direct: Vec<Label> = s.get_all_for_content_id(cid).await.unwrap().collect();
      assert_eq!(direct.len(), 1);
      assert_eq!(direct[0].value(), CorefValue::Negative);
      assert_eq!(direct[0].epoch_ticks(), T + 1000);
    }

    let positive = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert!(positive.is_empty());
    let negative = s.connected_component("a", CorefValue::Negative).await.unwrap();
    assert_eq!(negative.len(), 1);

    let current: Vec<Label> = s.everything(false).await.unwrap().collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].value(), CorefValue::Negative);

    let history: Vec<i64> = s
      .everything(true)
      .await
      .unwrap()
      .map(|l| l.epoch_ticks())
      .collect();
    assert_eq!(history, vec![T + 1000, T]);
  }

  #[tokio::test]
  async fn direct_connections_of_unknown_id_are_empty() {
    let s = store().await;
    s.put(&lab("a", "b", 1)).await.unwrap();
    assert_eq!(s.get_all_for_content_id("z").await.unwrap().count(), 0);
    assert_eq!(s.get_all_for_content_id("").await.unwrap().count(), 0);
  }

  // ─── connected_component ───────────────────────────────────────────────────

  #[tokio::test]
  async fn component_basic() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ac = lab("a", "c", 1);
    let bc = lab("b", "c", 1);
    put_all(&s, &[&ab, &ac, &bc]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(got.len(), 3);
    assert_eq!(as_set(got), HashSet::from([ab, ac, bc]));
  }

  #[tokio::test]
  async fn component_unordered() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ca = lab("c", "a", 1);
    let bc = lab("b", "c", 1);
    put_all(&s, &[&ab, &ca, &bc]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab, ca, bc]));
  }

  #[tokio::test]
  async fn component_filters_by_value() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ac = lab("a", "c", -1);
    let bc = lab("b", "c", 1);
    put_all(&s, &[&ab, &ac, &bc]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab, bc]));

    let got = s.connected_component("a", CorefValue::Negative).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ac]));
  }

  #[tokio::test]
  async fn component_is_transitive() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let bc = lab("b", "c", 1);
    let cd = lab("c", "d", 1);
    put_all(&s, &[&ab, &bc, &cd]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab, bc, cd]));
  }

  #[tokio::test]
  async fn component_stops_at_other_values() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let bc = lab("b", "c", -1);
    let cd = lab("c", "d", 1);
    put_all(&s, &[&ab, &bc, &cd]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab]));
  }

  #[tokio::test]
  async fn superseding_edge_grows_component() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let bc = lab("b", "c", -1);
    let cd = lab("c", "d", 1);
    put_all(&s, &[&ab, &bc, &cd]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab.clone()]));

    let bc = lab("b", "c", 1).with_epoch_ticks(T + 1).unwrap();
    s.put(&bc).await.unwrap();

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got.clone()), HashSet::from([ab, bc.clone(), cd]));
    let bc_got = got.iter().find(|l| **l == bc).unwrap();
    assert_eq!(bc_got.value(), CorefValue::Positive);
  }

  #[tokio::test]
  async fn superseding_edge_shrinks_component() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let bc = lab("b", "c", 1);
    let cd = lab("c", "d", 1);
    put_all(&s, &[&ab, &bc, &cd]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(got.len(), 3);

    let bc = lab("c", "b", -1).with_epoch_ticks(T + 1).unwrap();
    s.put(&bc).await.unwrap();

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab]));
  }

  #[tokio::test]
  async fn component_handles_cycles_and_self_links() {
    let s = store().await;
    let ab = lab("a", "b", 1);
    let ba_sub = lab("b", "a", 1).with_subtopics("x", "y");
    let aa = lab("a", "a", 1);
    put_all(&s, &[&ab, &ba_sub, &aa]).await;

    let got = s.connected_component("a", CorefValue::Positive).await.unwrap();
    assert_eq!(as_set(got), HashSet::from([ab, ba_sub, aa]));
  }

  #[tokio::test]
  async fn component_of_isolated_id_is_empty() {
    let s = store().await;
    s.put(&lab("a", "b", 1)).await.unwrap();
    let got = s.connected_component("z", CorefValue::Positive).await.unwrap();
    assert!(got.is_empty());
  }

  // ─── everything / delete_all ───────────────────────────────────────────────

  #[tokio::test]
  async fn everything_current_versions() {
    let s = store().await;
    let v1 = lab("c1", "c2", 1);
    let v2 = lab("c2", "c1", 1).with_epoch_ticks(T + 1000).unwrap();
    let v3 = lab("c1", "c2", -1).with_epoch_ticks(T + 2000).unwrap();
    let other = lab("c1", "c3", 0);
    put_all(&s, &[&v1, &v2, &v3, &other]).await;

    let all: Vec<Label> = s.everything(false).await.unwrap().collect();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].epoch_ticks(), T + 2000);
    assert_eq!(all[0].value(), CorefValue::Negative);
    assert_eq!(all[1], other);
  }

  #[tokio::test]
  async fn everything_with_history() {
    let s = store().await;
    let v1 = lab("c1", "c2", 1);
    let v2 = lab("c2", "c1", 1).with_epoch_ticks(T + 1000).unwrap();
    let v3 = lab("c1", "c2", -1).with_epoch_ticks(T + 2000).unwrap();
    put_all(&s, &[&v1, &v2, &v3]).await;

    let all: Vec<Label> = s.everything(true).await.unwrap().collect();
    let ticks: Vec<i64> = all.iter().map(Label::epoch_ticks).collect();
    assert_eq!(ticks, vec![T + 2000, T + 1000, T]);
    assert!(all.iter().all(|l| l.content_id1() == "c1"));
  }

  #[tokio::test]
  async fn delete_all_empties_the_store() {
    let s = store().await;
    put_all(&s, &[&lab("a", "b", 1), &lab("b", "c", 1)]).await;
    s.delete_all().await.unwrap();

    assert_eq!(s.everything(true).await.unwrap().count(), 0);
    assert!(matches!(
      s.get("a", "b", "", "", "").await,
      Err(Error::NotFound { .. })
    ));
  }

  #[tokio::test]
  async fn schema_conflict_surfaces_as_store_error() {
    let backend = MemoryStore::new();
    backend
      .setup_namespace(&[TableSchema::new(LABEL_TABLE, [FieldType::Str])])
      .await
      .unwrap();
    let err = LabelStore::new(backend).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
  }
}
