//! Report rendering.
//!
//! Pure functions turning fully populated reports into terminal tables,
//! push messages, or JSON.

pub mod message;
pub mod table;

use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize a report as pretty-printed JSON.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}
