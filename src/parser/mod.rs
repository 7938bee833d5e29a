//! Input loading.
//!
//! Reads a JSON configuration tree through a [`ContentSource`] and classifies
//! it into an [`InputDocument`]. Sub-modules:
//!
//! - [`source`] – File I/O abstraction

pub mod source;

pub use source::*;

use crate::model::InputDocument;
use anyhow::{Context, Result};
use camino::Utf8Path;

/// Read and classify the input document at `path`.
pub fn load_input<S: ContentSource>(
    source: &mut S,
    path: impl AsRef<Utf8Path>,
) -> Result<InputDocument> {
    let path = path.as_ref();
    let text = source.read_to_string(path)?;
    let doc = parse_input_str(&text).with_context(|| format!("Invalid input {}", path))?;
    tracing::debug!(path = %path, entries = doc.entries.len(), "loaded input");
    Ok(doc)
}

/// Parse and classify JSON text.
pub fn parse_input_str(text: &str) -> Result<InputDocument> {
    let value: serde_json::Value = serde_json::from_str(text).context("Failed to parse JSON")?;
    InputDocument::from_json(&value)
}
