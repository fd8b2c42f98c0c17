//! Deterministic text form of a routing document.

use serde::Serializer;

use super::types::RoutingDocument;

/// Largest magnitude at which every whole `f64` is exactly an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Write whole-valued numbers as integers (`0`, not `0.0`) so that a parsed
/// document serializes back to the text it came from.
pub(crate) fn whole_as_integer<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Pretty JSON with 2-space indentation and a trailing newline.
///
/// Key order follows insertion order, so the same document always yields the
/// same text. This is the form written to disk and compared for dirtiness.
pub fn to_json_text(doc: &RoutingDocument) -> String {
    match serde_json::to_string_pretty(doc) {
        Ok(mut text) => {
            text.push('\n');
            text
        }
        Err(e) => {
            // All maps are string-keyed, so this only fires on a serde_json bug.
            tracing::error!("failed to serialize routing document: {}", e);
            String::new()
        }
    }
}
