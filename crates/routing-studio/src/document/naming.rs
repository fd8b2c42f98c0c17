//! Model-id naming helpers.

/// Provider prefix of a `provider:model` id.
///
/// Returns `None` when there is no `:` or the id starts with one.
pub fn provider_of(model_id: &str) -> Option<&str> {
    match model_id.find(':') {
        Some(idx) if idx > 0 => Some(&model_id[..idx]),
        _ => None,
    }
}
