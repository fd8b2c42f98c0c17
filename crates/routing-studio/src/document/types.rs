use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::serialize::whole_as_integer;

pub type ProviderId = String;
pub type ModelId = String;
pub type ClassKey = String;

/// Unrecognized keys captured next to the typed fields of a record.
pub type Extra = JsonMap<String, JsonValue>;

/// The only document version this crate reads and writes.
pub const DOCUMENT_VERSION: u32 = 1;

/// Routing file v1. Unknown fields at every level are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDocument {
    pub version: u32,
    pub providers: IndexMap<ProviderId, ProviderConfig>,
    pub defaults: DefaultsConfig,
    /// Ordered fallback sequences; the first entry has the highest priority.
    pub classes: IndexMap<ClassKey, Vec<ModelId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_preference_map: Option<IndexMap<String, LegacyPreference>>,
    pub models: IndexMap<ModelId, ModelInfo>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub enabled: bool,
    /// Opaque user-defined bias; carried through untouched.
    #[serde(serialize_with = "whole_as_integer")]
    pub weight: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 0.0,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Class key used when the caller is licensed.
    pub licensed: ClassKey,
    /// Class key used when the caller is unlicensed.
    pub unlicensed: ClassKey,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Alias from an old preference key to either a class or a concrete model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LegacyPreference {
    Class {
        class: ClassKey,
        #[serde(flatten)]
        extra: Extra,
    },
    Explicit {
        model: ModelId,
        #[serde(flatten)]
        extra: Extra,
    },
}

impl LegacyPreference {
    pub fn class(class: impl Into<String>) -> Self {
        LegacyPreference::Class {
            class: class.into(),
            extra: Extra::new(),
        }
    }

    pub fn explicit(model: impl Into<String>) -> Self {
        LegacyPreference::Explicit {
            model: model.into(),
            extra: Extra::new(),
        }
    }
}

/// Scores in `[0, 1]` where higher is better, plus capability flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(serialize_with = "whole_as_integer")]
    pub reasoning: f64,
    /// Higher means faster.
    #[serde(serialize_with = "whole_as_integer")]
    pub latency: f64,
    /// Higher means cheaper.
    #[serde(serialize_with = "whole_as_integer")]
    pub cost: f64,
    pub context_tokens: u64,
    pub tools: bool,
    pub vision: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            reasoning: 0.5,
            latency: 0.5,
            cost: 0.5,
            context_tokens: 128_000,
            tools: true,
            vision: true,
            tags: Vec::new(),
            extra: Extra::new(),
        }
    }
}

impl ModelInfo {
    /// Read a named field as a finite number.
    ///
    /// Typed fields are looked up by their document key (`contextTokens`),
    /// booleans count as 0/1, and extra fields coerce from numbers, booleans
    /// and numeric strings. Anything else yields `None`.
    pub fn metric(&self, key: &str) -> Option<f64> {
        let v = match key {
            "reasoning" => Some(self.reasoning),
            "latency" => Some(self.latency),
            "cost" => Some(self.cost),
            "contextTokens" => Some(self.context_tokens as f64),
            "tools" => Some(bool_metric(self.tools)),
            "vision" => Some(bool_metric(self.vision)),
            "tags" => None,
            other => self.extra.get(other).and_then(coerce_metric),
        };
        v.filter(|n| n.is_finite())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn bool_metric(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn coerce_metric(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Bool(b) => Some(bool_metric(*b)),
        JsonValue::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                t.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_with_extra(extra: JsonValue) -> ModelInfo {
        let JsonValue::Object(map) = extra else {
            panic!("extra must be an object");
        };
        ModelInfo {
            reasoning: 0.8,
            extra: map,
            ..Default::default()
        }
    }

    #[test]
    fn metric_reads_typed_fields_by_document_key() {
        let m = ModelInfo::default();
        assert_eq!(m.metric("reasoning"), Some(0.5));
        assert_eq!(m.metric("contextTokens"), Some(128_000.0));
        assert_eq!(m.metric("tools"), Some(1.0));
        assert_eq!(m.metric("tags"), None);
        assert_eq!(m.metric("missing"), None);
    }

    #[test]
    fn metric_coerces_extra_fields() {
        let m = model_with_extra(json!({
            "quality": 0.7,
            "score": " 0.25 ",
            "flag": false,
            "label": "fast",
            "empty": "",
            "nothing": null,
            "list": [1],
            "huge": "1e400"
        }));
        assert_eq!(m.metric("quality"), Some(0.7));
        assert_eq!(m.metric("score"), Some(0.25));
        assert_eq!(m.metric("flag"), Some(0.0));
        assert_eq!(m.metric("label"), None);
        assert_eq!(m.metric("empty"), None);
        assert_eq!(m.metric("nothing"), None);
        assert_eq!(m.metric("list"), None);
        assert_eq!(m.metric("huge"), None);
    }

    #[test]
    fn legacy_preference_keeps_extra_fields() {
        let v = json!({"kind": "explicit", "model": "openai:gpt-4.1", "note": "pinned"});
        let pref: LegacyPreference = serde_json::from_value(v.clone()).expect("decode");
        match &pref {
            LegacyPreference::Explicit { model, extra } => {
                assert_eq!(model, "openai:gpt-4.1");
                assert_eq!(extra.get("note"), Some(&json!("pinned")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(serde_json::to_value(&pref).expect("encode"), v);
    }
}
