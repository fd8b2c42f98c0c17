use indexmap::IndexMap;

use super::types::{ClassMeta, MetricDefinition, UiConfig};

pub fn default_ui_config() -> UiConfig {
    let metric = |key: &str, label: &str, description: &str| MetricDefinition {
        key: key.to_string(),
        label: label.to_string(),
        description: Some(description.to_string()),
        min: 0.0,
        max: 1.0,
        step: 0.05,
        higher_is_better: true,
    };
    let metric_definitions = vec![
        metric(
            "reasoning",
            "Reasoning",
            "0..1 where higher means better reasoning/quality.",
        ),
        metric(
            "latency",
            "Speed",
            "0..1 where higher means faster (lower latency).",
        ),
        metric(
            "cost",
            "Cost efficiency",
            "0..1 where higher means cheaper / better value.",
        ),
    ];

    let mut class_meta = IndexMap::new();
    for (key, label, description) in [
        ("default", "Default", "Balanced routing for general usage."),
        (
            "frontier",
            "Frontier",
            "Highest capability models (often higher cost).",
        ),
        ("fast", "Fast", "Low latency models."),
        ("cheap", "Cheap", "Low cost models."),
        ("long", "Long context", "Models suited to long context windows."),
    ] {
        class_meta.insert(
            key.to_string(),
            ClassMeta {
                key: key.to_string(),
                label: label.to_string(),
                description: Some(description.to_string()),
                icon: None,
                rules: None,
            },
        );
    }

    UiConfig {
        metric_definitions,
        class_meta,
    }
}
