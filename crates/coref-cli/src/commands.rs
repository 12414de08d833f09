//! Command implementations, generic over the storage backend.

use std::io::Write;

use anyhow::{Context as _, Result, bail};
use coref_core::{Label, LabelStore, OrderedStore};

use crate::{cli::Command, format::format_label};

fn print_labels(
  labels: impl IntoIterator<Item = Label>,
  json: bool,
  out: &mut impl Write,
) -> Result<()> {
  if json {
    let labels: Vec<Label> = labels.into_iter().collect();
    serde_json::to_writer_pretty(&mut *out, &labels)?;
    writeln!(out)?;
  } else {
    for label in labels {
      writeln!(out, "{}", format_label(&label))?;
    }
  }
  Ok(())
}

/// Execute one parsed command against `store`, writing results to `out`.
pub async fn run<S: OrderedStore>(
  store: &LabelStore<S>,
  command: Command,
  out: &mut impl Write,
) -> Result<()> {
  match command {
    Command::List { include_deleted } => {
      let labels = store
        .everything(include_deleted)
        .await
        .context("listing labels")?;
      print_labels(labels, false, out)?;
    }

    Command::Put {
      content_id1,
      content_id2,
      annotator_id,
      value,
      subtopics,
      epoch_ticks,
    } => {
      let mut label = Label::new(content_id1, content_id2, annotator_id, value)
        .with_subtopics(subtopics.subtopic1, subtopics.subtopic2);
      if let Some(ticks) = epoch_ticks {
        label = label.with_epoch_ticks(ticks)?;
      }
      store.put(&label).await.context("writing label")?;
    }

    Command::Get {
      content_id1,
      content_id2,
      annotator_id,
      subtopics,
      json,
    } => {
      let label = store
        .get(
          &content_id1,
          &content_id2,
          &annotator_id,
          &subtopics.subtopic1,
          &subtopics.subtopic2,
        )
        .await?;
      if json {
        serde_json::to_writer_pretty(&mut *out, &label)?;
        writeln!(out)?;
      } else {
        writeln!(out, "{}", format_label(&label))?;
      }
    }

    Command::Component { content_id, value, json } => {
      let labels = store
        .connected_component(&content_id, value)
        .await
        .with_context(|| format!("resolving component of {content_id}"))?;
      print_labels(labels, json, out)?;
    }

    Command::DeleteAll { yes } => {
      if !yes {
        bail!("refusing to delete every label without --yes");
      }
      store.delete_all().await.context("clearing labels")?;
    }
  }
  Ok(())
}
