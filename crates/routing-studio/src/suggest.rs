//! Rule-based model suggestions for a class.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{ModelId, ModelInfo, RoutingDocument};

/// Comparison used by a metric rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricOp {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl MetricOp {
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            MetricOp::Gte => value >= threshold,
            MetricOp::Lte => value <= threshold,
            MetricOp::Gt => value > threshold,
            MetricOp::Lt => value < threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricOp::Gte => ">=",
            MetricOp::Lte => "<=",
            MetricOp::Gt => ">",
            MetricOp::Lt => "<",
        }
    }
}

/// Predicate a model must satisfy to be suggested for a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClassRule {
    Tag {
        tag: String,
    },
    Metric {
        metric: String,
        op: MetricOp,
        value: f64,
    },
}

impl ClassRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        ClassRule::Tag { tag: tag.into() }
    }

    pub fn metric(metric: impl Into<String>, op: MetricOp, value: f64) -> Self {
        ClassRule::Metric {
            metric: metric.into(),
            op,
            value,
        }
    }

    /// A missing or non-numeric metric field fails the rule.
    pub fn matches(&self, info: &ModelInfo) -> bool {
        match self {
            ClassRule::Tag { tag } => info.has_tag(tag),
            ClassRule::Metric { metric, op, value } => info
                .metric(metric)
                .is_some_and(|v| op.compare(v, *value)),
        }
    }
}

impl fmt::Display for ClassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRule::Tag { tag } => write!(f, "tag:{tag}"),
            ClassRule::Metric { metric, op, value } => {
                write!(f, "{}{}{}", metric, op.as_str(), value)
            }
        }
    }
}

/// Failure to read a metric rule expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("expected <metric><op><number> with op one of >=, <=, >, < (got '{0}')")]
    MissingOperator(String),
    #[error("missing metric name in '{0}'")]
    MissingMetric(String),
    #[error("invalid threshold in '{0}'")]
    InvalidThreshold(String),
    #[error("threshold must be finite in '{0}'")]
    NonFiniteThreshold(String),
}

/// Parses `<metric><op><number>`, e.g. `reasoning>=0.8` or `cost < 0.3`.
impl FromStr for ClassRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Two-char operators first so `>=` is not read as `>`.
        for op in [MetricOp::Gte, MetricOp::Lte, MetricOp::Gt, MetricOp::Lt] {
            if let Some((metric, value)) = s.split_once(op.as_str()) {
                let metric = metric.trim();
                if metric.is_empty() {
                    return Err(RuleParseError::MissingMetric(s.to_string()));
                }
                let value: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| RuleParseError::InvalidThreshold(s.to_string()))?;
                if !value.is_finite() {
                    return Err(RuleParseError::NonFiniteThreshold(s.to_string()));
                }
                return Ok(ClassRule::metric(metric, op, value));
            }
        }
        Err(RuleParseError::MissingOperator(s.to_string()))
    }
}

/// Model ids satisfying every rule, best `reasoning` first.
///
/// An empty rule set matches every model. Ties keep document order.
pub fn suggest_models_for_class(doc: &RoutingDocument, rules: &[ClassRule]) -> Vec<ModelId> {
    let mut out: Vec<(&ModelId, f64)> = doc
        .models
        .iter()
        .filter(|(_, info)| rules.iter().all(|r| r.matches(info)))
        .map(|(id, info)| (id, sort_score(info)))
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    tracing::debug!(
        "suggested {} of {} model(s) for {} rule(s)",
        out.len(),
        doc.models.len(),
        rules.len()
    );
    out.into_iter().map(|(id, _)| id.clone()).collect()
}

fn sort_score(info: &ModelInfo) -> f64 {
    if info.reasoning.is_finite() {
        info.reasoning
    } else {
        0.0
    }
}
