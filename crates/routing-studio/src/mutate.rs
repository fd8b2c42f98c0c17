//! Edits applied to a draft copy of the routing document.
//!
//! Each function returns `true` when it changed the draft. A `false` return
//! means the precondition did not hold and the draft is untouched, so the
//! caller can skip committing a new history entry.

use indexmap::IndexMap;

use crate::document::{LegacyPreference, ModelInfo, ProviderConfig, RoutingDocument};

/// Which default class slot to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSlot {
    Licensed,
    Unlicensed,
}

pub fn add_provider(doc: &mut RoutingDocument, id: &str) -> bool {
    let id = id.trim();
    if id.is_empty() || doc.providers.contains_key(id) {
        return false;
    }
    doc.providers.insert(id.to_string(), ProviderConfig::default());
    true
}

/// References from classes and models are left in place; validation flags them.
pub fn remove_provider(doc: &mut RoutingDocument, id: &str) -> bool {
    doc.providers.shift_remove(id).is_some()
}

pub fn set_provider_enabled(doc: &mut RoutingDocument, id: &str, enabled: bool) -> bool {
    match doc.providers.get_mut(id) {
        Some(p) if p.enabled != enabled => {
            p.enabled = enabled;
            true
        }
        _ => false,
    }
}

/// Non-finite weights are stored as 0.
pub fn set_provider_weight(doc: &mut RoutingDocument, id: &str, weight: f64) -> bool {
    let weight = if weight.is_finite() { weight } else { 0.0 };
    match doc.providers.get_mut(id) {
        Some(p) if p.weight != weight => {
            p.weight = weight;
            true
        }
        _ => false,
    }
}

pub fn add_class(doc: &mut RoutingDocument, key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() || doc.classes.contains_key(key) {
        return false;
    }
    doc.classes.insert(key.to_string(), Vec::new());
    true
}

/// Rename a class in place and follow the rename in defaults and legacy entries.
pub fn rename_class(doc: &mut RoutingDocument, from: &str, to: &str) -> bool {
    let to = to.trim();
    if to.is_empty() || to == from || doc.classes.contains_key(to) {
        return false;
    }
    if !rename_key(&mut doc.classes, from, to) {
        return false;
    }

    for slot in [&mut doc.defaults.licensed, &mut doc.defaults.unlicensed] {
        if *slot == from {
            *slot = to.to_string();
        }
    }
    if let Some(legacy) = doc.legacy_preference_map.as_mut() {
        for pref in legacy.values_mut() {
            if let LegacyPreference::Class { class, .. } = pref
                && *class == from
            {
                *class = to.to_string();
            }
        }
    }
    true
}

/// Defaults and legacy entries pointing at the class are left dangling.
pub fn remove_class(doc: &mut RoutingDocument, key: &str) -> bool {
    doc.classes.shift_remove(key).is_some()
}

pub fn push_class_model(doc: &mut RoutingDocument, class: &str, model_id: &str) -> bool {
    let model_id = model_id.trim();
    if model_id.is_empty() {
        return false;
    }
    match doc.classes.get_mut(class) {
        Some(seq) => {
            seq.push(model_id.to_string());
            true
        }
        None => false,
    }
}

pub fn remove_class_model(doc: &mut RoutingDocument, class: &str, index: usize) -> bool {
    match doc.classes.get_mut(class) {
        Some(seq) if index < seq.len() => {
            seq.remove(index);
            true
        }
        _ => false,
    }
}

/// Move the entry at `from` so it ends up at index `to`.
pub fn move_class_model(doc: &mut RoutingDocument, class: &str, from: usize, to: usize) -> bool {
    let Some(seq) = doc.classes.get_mut(class) else {
        return false;
    };
    if from == to || from >= seq.len() || to >= seq.len() {
        return false;
    }
    let item = seq.remove(from);
    seq.insert(to, item);
    true
}

/// Replace a class sequence with suggested ids.
pub fn apply_suggestions(doc: &mut RoutingDocument, class: &str, ids: Vec<String>) -> bool {
    match doc.classes.get_mut(class) {
        Some(seq) if *seq != ids => {
            *seq = ids;
            true
        }
        _ => false,
    }
}

/// Insert a model with default scores.
pub fn add_model(doc: &mut RoutingDocument, id: &str) -> bool {
    let id = id.trim();
    if id.is_empty() || doc.models.contains_key(id) {
        return false;
    }
    doc.models.insert(id.to_string(), ModelInfo::default());
    true
}

/// Rename a model and rewrite every class entry and explicit legacy entry using it.
pub fn rename_model(doc: &mut RoutingDocument, from: &str, to: &str) -> bool {
    let to = to.trim();
    if to.is_empty() || to == from || doc.models.contains_key(to) {
        return false;
    }
    if !rename_key(&mut doc.models, from, to) {
        return false;
    }

    for seq in doc.classes.values_mut() {
        for id in seq.iter_mut().filter(|id| id.as_str() == from) {
            *id = to.to_string();
        }
    }
    if let Some(legacy) = doc.legacy_preference_map.as_mut() {
        for pref in legacy.values_mut() {
            if let LegacyPreference::Explicit { model, .. } = pref
                && *model == from
            {
                *model = to.to_string();
            }
        }
    }
    true
}

pub fn remove_model(doc: &mut RoutingDocument, id: &str) -> bool {
    doc.models.shift_remove(id).is_some()
}

/// Replace a model's record wholesale (metric sliders, tags, flags).
pub fn set_model(doc: &mut RoutingDocument, id: &str, info: ModelInfo) -> bool {
    match doc.models.get_mut(id) {
        Some(current) if *current != info => {
            *current = info;
            true
        }
        _ => false,
    }
}

pub fn set_default(doc: &mut RoutingDocument, slot: DefaultSlot, class: &str) -> bool {
    let target = match slot {
        DefaultSlot::Licensed => &mut doc.defaults.licensed,
        DefaultSlot::Unlicensed => &mut doc.defaults.unlicensed,
    };
    if *target == class {
        return false;
    }
    *target = class.to_string();
    true
}

pub fn set_legacy_preference(doc: &mut RoutingDocument, key: &str, pref: LegacyPreference) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return false;
    }
    let legacy = doc.legacy_preference_map.get_or_insert_with(IndexMap::new);
    if legacy.get(key) == Some(&pref) {
        return false;
    }
    legacy.insert(key.to_string(), pref);
    true
}

pub fn remove_legacy_preference(doc: &mut RoutingDocument, key: &str) -> bool {
    doc.legacy_preference_map
        .as_mut()
        .is_some_and(|legacy| legacy.shift_remove(key).is_some())
}

/// Rename `from` to `to` keeping its position. `false` if `from` is absent.
fn rename_key<V>(map: &mut IndexMap<String, V>, from: &str, to: &str) -> bool {
    let Some(index) = map.get_index_of(from) else {
        return false;
    };
    let Some(value) = map.shift_remove(from) else {
        return false;
    };
    let (end, _) = map.insert_full(to.to_string(), value);
    map.move_index(end, index);
    true
}
