//! Command-line arguments for `coref`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coref_core::CorefValue;

#[derive(Parser, Debug)]
#[command(name = "coref", version, about = "Store and inspect coreference labels")]
pub struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "coref.toml")]
  pub config: PathBuf,

  /// Path to the label database; overrides the config file.
  #[arg(long, env = "COREF_STORE", value_name = "PATH")]
  pub store: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Print every label, one per line, in storage order.
  List {
    /// Also print superseded versions.
    #[arg(long)]
    include_deleted: bool,
  },

  /// Record a new label.
  Put {
    content_id1:  String,
    content_id2:  String,
    annotator_id: String,
    /// `-1`, `0`, `1` or `negative`, `unknown`, `positive`.
    #[arg(allow_negative_numbers = true)]
    value:        CorefValue,
    #[command(flatten)]
    subtopics:    Subtopics,
    /// Creation time in milliseconds since the epoch; defaults to now.
    #[arg(long)]
    epoch_ticks:  Option<i64>,
  },

  /// Print the most recent label for one pair and annotator.
  Get {
    content_id1:  String,
    content_id2:  String,
    annotator_id: String,
    #[command(flatten)]
    subtopics:    Subtopics,
    /// Print JSON instead of the list format.
    #[arg(long)]
    json:         bool,
  },

  /// Print every label transitively connected to a content id by `value`.
  Component {
    content_id: String,
    #[arg(allow_negative_numbers = true)]
    value:      CorefValue,
    /// Print JSON instead of the list format.
    #[arg(long)]
    json:       bool,
  },

  /// Delete every label, including history.
  DeleteAll {
    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Args, Debug, Default)]
pub struct Subtopics {
  #[arg(long, default_value = "")]
  pub subtopic1: String,
  #[arg(long, default_value = "")]
  pub subtopic2: String,
}
