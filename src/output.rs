//! Terminal rendering for API responses.
//!
//! Renderers return the text instead of printing so `main` decides where it
//! goes.

pub mod backrest;
pub mod status;
pub mod table;
pub mod workflow;

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-printed JSON for `--output json`.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to encode JSON output")
}
