use super::protocol::{CoreMessage, HostCommand, HostMessage, LogLevel};
use crate::editor::{LoadOptions, RoutingEditor};

/// Result of handling one host message.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Messages to send back immediately.
    pub replies: Vec<CoreMessage>,
    /// The current text should be offered to the host (document changed or
    /// the session just became initialised).
    pub changed: bool,
}

/// Maps host messages onto a [`RoutingEditor`].
pub struct BridgeSession {
    editor: RoutingEditor,
    initialised: bool,
}

impl BridgeSession {
    pub fn new(editor: RoutingEditor) -> Self {
        Self {
            editor,
            initialised: false,
        }
    }

    pub fn editor(&self) -> &RoutingEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RoutingEditor {
        &mut self.editor
    }

    /// Whether the host has sent `init`, `setFileInfo` or `setText` yet.
    /// Text updates are held back until then.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn handle(&mut self, msg: HostMessage) -> Outcome {
        let mut outcome = match msg {
            HostMessage::Init {
                text,
                file_name,
                uri,
            } => {
                let opts = LoadOptions {
                    file_uri: Some(uri),
                    mark_saved: true,
                };
                self.load(&text, &file_name, opts)
            }
            HostMessage::SetFileInfo { file_name, uri } => {
                self.editor.set_file_name(file_name);
                self.editor.set_file_uri(uri);
                Outcome::default()
            }
            HostMessage::SetText { text } => {
                let name = self.editor.file_name().to_string();
                self.load(&text, &name, LoadOptions::default())
            }
            HostMessage::ValidateResult { issues } => {
                tracing::info!("host reported {} validation issue(s)", issues.len());
                for issue in &issues {
                    tracing::debug!("{} {}: {}", issue.severity, issue.path, issue.message);
                }
                return Outcome::default();
            }
        };
        // Becoming initialised offers the current text even when the load failed.
        if !self.initialised {
            self.initialised = true;
            outcome.changed = true;
        }
        outcome
    }

    fn load(&mut self, text: &str, name: &str, opts: LoadOptions) -> Outcome {
        match self.editor.load_from_text(text, Some(name), opts) {
            Ok(()) => Outcome {
                replies: Vec::new(),
                changed: true,
            },
            Err(e) => Outcome {
                replies: vec![CoreMessage::Log {
                    level: LogLevel::Error,
                    message: format!("Failed to load {name}: {e}"),
                    data: Some(serde_json::Value::String(e.detailed())),
                }],
                changed: false,
            },
        }
    }

    /// Build a command for the host, attaching the current text where the
    /// command needs it. `save` also advances the saved baseline.
    pub fn command(&mut self, command: HostCommand) -> CoreMessage {
        let text = command.carries_text().then(|| self.editor.current_text());
        if command == HostCommand::Save {
            self.editor.mark_saved();
        }
        CoreMessage::Command { command, text }
    }

    pub fn update_text(&self) -> CoreMessage {
        CoreMessage::UpdateText {
            text: self.editor.current_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{starter_document, to_json_text};
    use crate::mutate;
    use crate::uiconfig::MemoryUiConfigStore;

    fn session() -> BridgeSession {
        BridgeSession::new(RoutingEditor::new(Box::new(MemoryUiConfigStore::new())))
    }

    fn doc_text_with_provider(id: &str) -> String {
        let mut doc = starter_document();
        mutate::add_provider(&mut doc, id);
        to_json_text(&doc)
    }

    #[test]
    fn init_loads_clean_document() {
        let mut s = session();
        assert!(!s.is_initialised());
        let out = s.handle(HostMessage::Init {
            text: doc_text_with_provider("anthropic"),
            file_name: "team.routing.json".into(),
            uri: Some("file:///team.routing.json".into()),
        });
        assert!(out.changed);
        assert!(out.replies.is_empty());
        assert!(s.is_initialised());
        assert!(!s.editor().is_dirty());
        assert_eq!(s.editor().file_name(), "team.routing.json");
        assert_eq!(s.editor().file_uri(), Some("file:///team.routing.json"));
        assert!(s.editor().document().providers.contains_key("anthropic"));
    }

    #[test]
    fn set_text_with_invalid_json_reports_error() {
        let mut s = session();
        let before = s.editor().snapshot();
        let out = s.handle(HostMessage::SetText { text: "{".into() });
        assert!(matches!(
            out.replies.as_slice(),
            [CoreMessage::Log { level: LogLevel::Error, .. }]
        ));
        assert!(out.changed, "first message initialises the session");
        assert_eq!(s.editor().document(), before.as_ref());

        let out = s.handle(HostMessage::SetText { text: "{".into() });
        assert!(!out.changed);
        assert_eq!(out.replies.len(), 1);
    }

    #[test]
    fn set_text_discards_history() {
        let mut s = session();
        s.editor_mut().update(|d| mutate::add_class(d, "long"));
        assert!(s.editor().can_undo());
        let out = s.handle(HostMessage::SetText {
            text: doc_text_with_provider("google"),
        });
        assert!(out.changed);
        assert!(!s.editor().can_undo());
    }

    #[test]
    fn set_file_info_initialises_and_keeps_document() {
        let mut s = session();
        let before = s.editor().snapshot();
        let out = s.handle(HostMessage::SetFileInfo {
            file_name: "renamed.json".into(),
            uri: Some("file:///renamed.json".into()),
        });
        assert!(out.changed);
        assert!(s.is_initialised());
        assert_eq!(s.editor().file_name(), "renamed.json");
        assert_eq!(s.editor().file_uri(), Some("file:///renamed.json"));
        assert!(std::sync::Arc::ptr_eq(&before, &s.editor().snapshot()));

        let out = s.handle(HostMessage::SetFileInfo {
            file_name: "again.json".into(),
            uri: None,
        });
        assert!(!out.changed);
        assert_eq!(s.editor().file_uri(), None);
    }

    #[test]
    fn validate_result_does_not_initialise() {
        let mut s = session();
        let out = s.handle(HostMessage::ValidateResult { issues: Vec::new() });
        assert!(!out.changed);
        assert!(!s.is_initialised());
    }

    #[test]
    fn save_command_attaches_text_and_marks_baseline() {
        let mut s = session();
        s.editor_mut().update(|d| mutate::add_class(d, "long"));
        assert!(s.editor().is_dirty());
        let msg = s.command(HostCommand::Save);
        let expected = s.editor().current_text();
        assert_eq!(
            msg,
            CoreMessage::Command {
                command: HostCommand::Save,
                text: Some(expected)
            }
        );
        assert!(!s.editor().is_dirty());

        let msg = s.command(HostCommand::Open);
        assert_eq!(
            msg,
            CoreMessage::Command {
                command: HostCommand::Open,
                text: None
            }
        );
    }
}
