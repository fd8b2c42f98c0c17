use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One violated structural constraint, located by dot-joined field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failure to turn raw text into a routing document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The text is not syntactically valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    /// Valid JSON that does not match the document shape.
    #[error("Schema validation failed.")]
    SchemaViolation { issues: Vec<SchemaIssue> },
}

impl ParseError {
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            ParseError::InvalidJson(_) => &[],
            ParseError::SchemaViolation { issues } => issues,
        }
    }

    /// Message plus one `path: message` line per schema issue.
    pub fn detailed(&self) -> String {
        let mut out = self.to_string();
        for issue in self.issues() {
            out.push('\n');
            if issue.path.is_empty() {
                out.push_str(&issue.message);
            } else {
                out.push_str(&format!("{}: {}", issue.path, issue.message));
            }
        }
        out
    }
}
