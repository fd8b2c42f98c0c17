//! Structural check of a routing document in its raw JSON form.
//!
//! The check is a subset test: declared fields must have the right shape,
//! undeclared fields are left alone. Every violation is reported rather than
//! stopping at the first one. Two normalizations happen in place so the typed
//! decode that follows cannot fail on shapes the check accepts: a missing
//! model `tags` becomes `[]`, and whole-valued floats in integer fields
//! (`version`, `contextTokens`) become integers.

use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::SchemaIssue;

const LEGACY_KINDS: &str = "'class' | 'explicit'";

pub fn check_document(root: &mut JsonValue) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    if !root.is_object() {
        issues.push(type_issue("", "object", root));
        return issues;
    }
    let Some(obj) = root.as_object_mut() else {
        return issues;
    };

    check_version(obj, &mut issues);

    if let Some(providers) = require_object(obj, "providers", "", &mut issues) {
        for (id, cfg) in providers.iter_mut() {
            let path = child("providers", id);
            let Some(cfg) = expect_object(cfg, &path, &mut issues) else {
                continue;
            };
            require_bool(cfg, "enabled", &path, &mut issues);
            require_number(cfg, "weight", &path, &mut issues);
        }
    }

    if let Some(defaults) = require_object(obj, "defaults", "", &mut issues) {
        require_string(defaults, "licensed", "defaults", &mut issues);
        require_string(defaults, "unlicensed", "defaults", &mut issues);
    }

    if let Some(classes) = require_object(obj, "classes", "", &mut issues) {
        for (key, seq) in classes.iter() {
            let path = child("classes", key);
            check_string_array(seq, &path, &mut issues);
        }
    }

    if let Some(legacy) = obj.get_mut("legacyPreferenceMap") {
        if let Some(entries) = expect_object(legacy, "legacyPreferenceMap", &mut issues) {
            for (key, pref) in entries.iter_mut() {
                let path = child("legacyPreferenceMap", key);
                check_legacy_preference(pref, &path, &mut issues);
            }
        }
    }

    if let Some(models) = require_object(obj, "models", "", &mut issues) {
        for (id, info) in models.iter_mut() {
            let path = child("models", id);
            let Some(info) = expect_object(info, &path, &mut issues) else {
                continue;
            };
            check_model(info, &path, &mut issues);
        }
    }

    issues
}

fn check_version(obj: &mut JsonMap<String, JsonValue>, issues: &mut Vec<SchemaIssue>) {
    match obj.get_mut("version") {
        None => issues.push(SchemaIssue::new("version", "Required")),
        Some(v) => {
            if v.as_f64() == Some(1.0) {
                *v = JsonValue::from(1u32);
            } else {
                issues.push(SchemaIssue::new(
                    "version",
                    "Invalid literal value, expected 1",
                ));
            }
        }
    }
}

fn check_legacy_preference(pref: &mut JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(obj) = expect_object(pref, path, issues) else {
        return;
    };
    match obj.get("kind").and_then(|k| k.as_str()) {
        Some("class") => require_string(obj, "class", path, issues),
        Some("explicit") => require_string(obj, "model", path, issues),
        _ => issues.push(SchemaIssue::new(
            child(path, "kind"),
            format!("Invalid discriminator value. Expected {LEGACY_KINDS}"),
        )),
    }
}

fn check_model(info: &mut JsonMap<String, JsonValue>, path: &str, issues: &mut Vec<SchemaIssue>) {
    for key in ["reasoning", "latency", "cost"] {
        if let Some(n) = require_number(info, key, path, issues) {
            if n < 0.0 {
                issues.push(SchemaIssue::new(
                    child(path, key),
                    "Number must be greater than or equal to 0",
                ));
            } else if n > 1.0 {
                issues.push(SchemaIssue::new(
                    child(path, key),
                    "Number must be less than or equal to 1",
                ));
            }
        }
    }

    let tokens_path = child(path, "contextTokens");
    match info.get_mut("contextTokens") {
        None => issues.push(SchemaIssue::new(tokens_path, "Required")),
        Some(v) if v.is_u64() => {}
        Some(v) => match v.as_f64() {
            None => issues.push(type_issue(&tokens_path, "number", v)),
            Some(n) if n.fract() != 0.0 => {
                issues.push(SchemaIssue::new(tokens_path, "Expected integer, received float"))
            }
            Some(n) if n < 0.0 => issues.push(SchemaIssue::new(
                tokens_path,
                "Number must be greater than or equal to 0",
            )),
            // u64::MAX rounds up to 2^64 as f64, so anything this large is out of range.
            Some(n) if n >= u64::MAX as f64 => issues.push(SchemaIssue::new(
                tokens_path,
                format!("Number must be less than or equal to {}", u64::MAX),
            )),
            Some(n) => *v = JsonValue::from(n as u64),
        },
    }

    require_bool(info, "tools", path, issues);
    require_bool(info, "vision", path, issues);

    match info.get("tags") {
        None => {
            info.insert("tags".to_string(), JsonValue::Array(Vec::new()));
        }
        Some(tags) => check_string_array(tags, &child(path, "tags"), issues),
    }
}

fn check_string_array(v: &JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(items) = v.as_array() else {
        issues.push(type_issue(path, "array", v));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            issues.push(type_issue(&child(path, &i.to_string()), "string", item));
        }
    }
}

fn require_object<'a>(
    obj: &'a mut JsonMap<String, JsonValue>,
    key: &str,
    parent: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<&'a mut JsonMap<String, JsonValue>> {
    let path = child(parent, key);
    match obj.get_mut(key) {
        None => {
            issues.push(SchemaIssue::new(path, "Required"));
            None
        }
        Some(v) => expect_object(v, &path, issues),
    }
}

fn expect_object<'a>(
    v: &'a mut JsonValue,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<&'a mut JsonMap<String, JsonValue>> {
    if !v.is_object() {
        issues.push(type_issue(path, "object", v));
    }
    v.as_object_mut()
}

fn require_bool(
    obj: &JsonMap<String, JsonValue>,
    key: &str,
    parent: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    match obj.get(key) {
        None => issues.push(SchemaIssue::new(child(parent, key), "Required")),
        Some(v) if !v.is_boolean() => issues.push(type_issue(&child(parent, key), "boolean", v)),
        Some(_) => {}
    }
}

fn require_string(
    obj: &JsonMap<String, JsonValue>,
    key: &str,
    parent: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    match obj.get(key) {
        None => issues.push(SchemaIssue::new(child(parent, key), "Required")),
        Some(v) if !v.is_string() => issues.push(type_issue(&child(parent, key), "string", v)),
        Some(_) => {}
    }
}

fn require_number(
    obj: &JsonMap<String, JsonValue>,
    key: &str,
    parent: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<f64> {
    match obj.get(key) {
        None => {
            issues.push(SchemaIssue::new(child(parent, key), "Required"));
            None
        }
        Some(v) => {
            let n = v.as_f64();
            if n.is_none() {
                issues.push(type_issue(&child(parent, key), "number", v));
            }
            n
        }
    }
}

fn type_issue(path: &str, expected: &str, found: &JsonValue) -> SchemaIssue {
    SchemaIssue::new(
        path,
        format!("Expected {}, received {}", expected, json_type_name(found)),
    )
}

fn json_type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn child(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
