//! Newline-delimited JSON messages exchanged with the editor host.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::validate::ValidationIssue;

/// Host → core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    Init {
        text: String,
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    SetFileInfo {
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    SetText {
        text: String,
    },
    ValidateResult {
        issues: Vec<ValidationIssue>,
    },
}

/// Core → host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CoreMessage {
    Ready,
    UpdateText {
        text: String,
    },
    Command {
        command: HostCommand,
        /// Snapshot of the current document so the host never acts on a
        /// stale debounced text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Log {
        level: LogLevel,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<JsonValue>,
    },
}

impl CoreMessage {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        CoreMessage::Log {
            level,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostCommand {
    Open,
    NewFile,
    Save,
    Export,
    Validate,
    ShowOutput,
}

impl HostCommand {
    /// Commands that act on the document text and so carry a snapshot of it.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            HostCommand::Save | HostCommand::Export | HostCommand::Validate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}
