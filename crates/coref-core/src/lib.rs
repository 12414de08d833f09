//! Core types and the label store façade for coreference ground truth.
//!
//! A [`Label`] is an immutable judgment linking two content items. The
//! [`LabelStore`] persists labels into any [`OrderedStore`] backend and answers
//! point lookups, per-item scans and transitive connected-component queries.
//!
//! This crate is deliberately free of database and CLI dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod key;
pub mod label;
pub mod label_store;
pub mod memory;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use label::{Label, MAX_TICKS};
pub use label_store::{LabelStore, LatestLabels, latest_labels};
pub use store::OrderedStore;
pub use value::CorefValue;
