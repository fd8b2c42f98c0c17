//! Schema & parse layer: raw text to a structurally valid routing document.
//!
//! Parsing happens in three steps: JSON syntax, a structural check over the
//! untyped value that collects every violation with its field path, and a
//! typed decode that keeps undeclared fields in each record's `extra` map.

pub mod check;
pub mod error;

pub use error::*;

use serde_json::Value as JsonValue;

use crate::document::RoutingDocument;

/// Parse routing document text.
///
/// Never panics; all failures come back as [`ParseError`].
pub fn parse_document(text: &str) -> Result<RoutingDocument, ParseError> {
    let mut json: JsonValue =
        serde_json::from_str(text).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let issues = check::check_document(&mut json);
    if !issues.is_empty() {
        tracing::debug!("schema check failed with {} issue(s)", issues.len());
        return Err(ParseError::SchemaViolation { issues });
    }

    serde_json::from_value(json).map_err(|e| ParseError::SchemaViolation {
        issues: vec![SchemaIssue::new("", e.to_string())],
    })
}
