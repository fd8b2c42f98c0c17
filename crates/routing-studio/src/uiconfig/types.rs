use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::suggest::ClassRule;

/// Slider definition for one model metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub higher_is_better: bool,
}

/// Display metadata and suggestion rules for a class key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMeta {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ClassRule>>,
}

/// Editor-only settings. Persisted separately and never written into a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub metric_definitions: Vec<MetricDefinition>,
    pub class_meta: IndexMap<String, ClassMeta>,
}

impl UiConfig {
    /// Suggestion rules attached to `class`, empty when none are set.
    pub fn rules_for(&self, class: &str) -> &[ClassRule] {
        self.class_meta
            .get(class)
            .and_then(|m| m.rules.as_deref())
            .unwrap_or(&[])
    }
}
