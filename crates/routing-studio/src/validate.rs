//! Referential integrity checks across document sections.
//!
//! Only a broken default class and "every provider disabled" are errors:
//! both leave routing with nothing to pick. Everything else is a warning
//! because routing still works, just with less metadata or fewer fallbacks.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{LegacyPreference, RoutingDocument, provider_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.pad(s)
    }
}

/// A non-fatal finding located by a dotted/bracketed document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Error and warning counts for a set of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueStatus {
    pub errors: usize,
    pub warnings: usize,
}

impl IssueStatus {
    pub fn of(issues: &[ValidationIssue]) -> Self {
        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Collect every integrity issue in `doc`, grouped by check in a fixed order.
pub fn validate_routing(doc: &RoutingDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_defaults(doc, &mut issues);
    check_classes(doc, &mut issues);
    check_model_providers(doc, &mut issues);
    check_enabled_providers(doc, &mut issues);
    check_legacy(doc, &mut issues);

    tracing::debug!(
        "validated routing document: {} issue(s)",
        issues.len()
    );
    issues
}

fn check_defaults(doc: &RoutingDocument, issues: &mut Vec<ValidationIssue>) {
    for (path, class) in [
        ("defaults.licensed", &doc.defaults.licensed),
        ("defaults.unlicensed", &doc.defaults.unlicensed),
    ] {
        if !doc.classes.contains_key(class) {
            issues.push(ValidationIssue::error(
                path,
                format!("Unknown class '{class}'."),
            ));
        }
    }
}

fn check_classes(doc: &RoutingDocument, issues: &mut Vec<ValidationIssue>) {
    for (class, seq) in &doc.classes {
        let path = format!("classes.{class}");
        if seq.is_empty() {
            issues.push(ValidationIssue::warning(
                &path,
                "Empty class: routing will have no fallbacks.",
            ));
        }

        let dupes = duplicated(seq);
        if !dupes.is_empty() {
            issues.push(ValidationIssue::warning(
                &path,
                format!("Duplicate model entries: {}.", dupes.join(", ")),
            ));
        }

        for (i, model_id) in seq.iter().enumerate() {
            let entry = format!("classes.{class}[{i}]");
            if !doc.models.contains_key(model_id) {
                issues.push(ValidationIssue::warning(
                    &entry,
                    format!(
                        "Model '{model_id}' is not defined in 'models'. It will route, but you lose metadata & scoring."
                    ),
                ));
            }
            if let Some(p) = provider_of(model_id)
                && !doc.providers.contains_key(p)
            {
                issues.push(ValidationIssue::warning(
                    &entry,
                    format!("Provider '{p}' is not defined in 'providers'."),
                ));
            }
        }
    }
}

/// Distinct ids that occur more than once, in order of first repeat.
fn duplicated(seq: &[String]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<&str> = Vec::new();
    for id in seq {
        if !seen.insert(id.as_str()) && !out.contains(&id.as_str()) {
            out.push(id);
        }
    }
    out
}

fn check_model_providers(doc: &RoutingDocument, issues: &mut Vec<ValidationIssue>) {
    for model_id in doc.models.keys() {
        if let Some(p) = provider_of(model_id)
            && !doc.providers.contains_key(p)
        {
            issues.push(ValidationIssue::warning(
                format!("models.{model_id}"),
                format!("Model provider '{p}' is missing from 'providers'."),
            ));
        }
    }
}

fn check_enabled_providers(doc: &RoutingDocument, issues: &mut Vec<ValidationIssue>) {
    if !doc.providers.is_empty() && !doc.providers.values().any(|p| p.enabled) {
        issues.push(ValidationIssue::error(
            "providers",
            "All providers are disabled. Routing will have no valid targets.",
        ));
    }
}

fn check_legacy(doc: &RoutingDocument, issues: &mut Vec<ValidationIssue>) {
    let Some(legacy) = doc.legacy_preference_map.as_ref() else {
        return;
    };
    for (key, pref) in legacy {
        let path = format!("legacyPreferenceMap.{key}");
        match pref {
            LegacyPreference::Class { class, .. } => {
                if !doc.classes.contains_key(class) {
                    issues.push(ValidationIssue::warning(
                        path,
                        format!("Legacy key maps to unknown class '{class}'."),
                    ));
                }
            }
            LegacyPreference::Explicit { model, .. } => {
                if !doc.models.contains_key(model) {
                    issues.push(ValidationIssue::warning(
                        path,
                        format!("Legacy key maps to unknown model '{model}'."),
                    ));
                }
            }
        }
    }
}
