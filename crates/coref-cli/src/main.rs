//! `coref` — command-line access to a coreference label store.
//!
//! Reads `coref.toml` (or the path given with `--config`) and `COREF_*`
//! environment variables, opens the SQLite store they name, and runs one
//! command against it.
//!
//! # Usage
//!
//! ```text
//! coref list --include-deleted
//! coref put doc1 doc2 alice 1 --subtopic1 para3
//! coref component doc1 positive --json
//! ```

mod cli;
mod commands;
mod format;

use std::{
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use cli::Cli;
use coref_core::LabelStore;
use coref_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings read from the config file and environment.
#[derive(Deserialize, Debug)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("labels.db") }

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("COREF"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries command output.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;

  // CLI flag overrides config file, which overrides the default.
  let store_path = expand_tilde(
    cli.store.as_deref().unwrap_or(settings.store_path.as_path()),
  );
  tracing::debug!(path = %store_path.display(), "opening label store");

  let backend = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = LabelStore::new(backend)
    .await
    .context("failed to initialise label table")?;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  commands::run(&store, cli.command, &mut out).await?;
  out.flush()?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
