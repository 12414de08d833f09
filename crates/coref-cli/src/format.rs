//! Human-readable rendering of labels.

use coref_core::Label;

fn side(content_id: &str, subtopic_id: &str) -> String {
  if subtopic_id.is_empty() {
    content_id.to_owned()
  } else {
    format!("{content_id}({subtopic_id})")
  }
}

/// `c1[(s1)] ==(1) c2[(s2)] by annotator at YYYY-MM-DD HH:MM:SS`, in UTC.
pub fn format_label(label: &Label) -> String {
  let at = label
    .epoch_time()
    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
    .unwrap_or_else(|| label.epoch_ticks().to_string());
  format!(
    "{} {}({}) {} by {} at {}",
    side(label.content_id1(), label.subtopic_id1()),
    label.value().symbol(),
    label.value(),
    side(label.content_id2(), label.subtopic_id2()),
    label.annotator_id(),
    at,
  )
}
