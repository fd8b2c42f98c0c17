use indexmap::IndexMap;

use super::types::{
    DOCUMENT_VERSION, DefaultsConfig, Extra, ModelInfo, ProviderConfig, RoutingDocument,
};

/// File name used for a document that has not been opened from or saved to disk.
pub const STARTER_FILE_NAME: &str = "starter.routing.json";

/// Minimal starter document: one provider, a handful of classes and models.
pub fn starter_document() -> RoutingDocument {
    let mut providers = IndexMap::new();
    providers.insert("openai".to_string(), ProviderConfig::default());

    let mut classes = IndexMap::new();
    for (key, seq) in [
        ("default", vec!["openai:gpt-4o-mini"]),
        ("frontier", vec!["openai:gpt-5.1", "openai:gpt-4.1"]),
        ("fast", vec!["openai:gpt-4o-mini"]),
        ("cheap", vec!["openai:gpt-4o-mini"]),
    ] {
        classes.insert(
            key.to_string(),
            seq.into_iter().map(str::to_string).collect(),
        );
    }

    let mk = |reasoning: f64, latency: f64, cost: f64, context_tokens: u64, tags: &[&str]| {
        ModelInfo {
            reasoning,
            latency,
            cost,
            context_tokens,
            tools: true,
            vision: true,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            extra: Extra::new(),
        }
    };
    let mut models = IndexMap::new();
    models.insert(
        "openai:gpt-4o-mini".to_string(),
        mk(0.55, 0.95, 0.95, 128_000, &["tools", "vision", "fast", "cheap"]),
    );
    models.insert(
        "openai:gpt-4.1".to_string(),
        mk(0.85, 0.7, 0.5, 128_000, &["tools", "vision", "long"]),
    );
    models.insert(
        "openai:gpt-5.1".to_string(),
        mk(0.95, 0.65, 0.35, 200_000, &["tools", "vision", "frontier"]),
    );

    RoutingDocument {
        version: DOCUMENT_VERSION,
        providers,
        defaults: DefaultsConfig {
            licensed: "default".to_string(),
            unlicensed: "default".to_string(),
            extra: Extra::new(),
        },
        classes,
        legacy_preference_map: Some(IndexMap::new()),
        models,
        extra: Extra::new(),
    }
}
