//! Editing session over a routing document.
//!
//! The editor owns the undo history, the saved-baseline text used for dirty
//! tracking, a raw JSON draft for text editing, and the UI config with its
//! store. New document versions are only produced by deep-copying the present
//! snapshot, editing the copy and committing it to history.

use std::sync::Arc;

use crate::document::{RoutingDocument, STARTER_FILE_NAME, starter_document, to_json_text};
use crate::history::History;
use crate::schema::{ParseError, parse_document};
use crate::suggest::suggest_models_for_class;
use crate::uiconfig::{UiConfig, UiConfigStore};
use crate::validate::{IssueStatus, ValidationIssue, validate_routing};

/// File name used when loading text without a name.
pub const FALLBACK_FILE_NAME: &str = "routing.json";

/// Options for [`RoutingEditor::load_from_text`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// `Some` replaces the file URI (with `Some(None)` clearing it); `None` keeps it.
    pub file_uri: Option<Option<String>>,
    /// Treat the loaded text as the saved baseline.
    pub mark_saved: bool,
}

pub struct RoutingEditor {
    history: History<RoutingDocument>,
    file_name: String,
    file_uri: Option<String>,
    baseline_text: String,
    raw_draft: String,
    raw_error: Option<String>,
    ui_config: UiConfig,
    store: Box<dyn UiConfigStore>,
}

impl RoutingEditor {
    /// Start on the starter document with UI config read from `store`.
    pub fn new(store: Box<dyn UiConfigStore>) -> Self {
        let doc = starter_document();
        let text = to_json_text(&doc);
        let ui_config = store.load();
        Self {
            history: History::new(doc),
            file_name: STARTER_FILE_NAME.to_string(),
            file_uri: None,
            baseline_text: text.clone(),
            raw_draft: text,
            raw_error: None,
            ui_config,
            store,
        }
    }

    pub fn document(&self) -> &RoutingDocument {
        self.history.present()
    }

    pub fn snapshot(&self) -> Arc<RoutingDocument> {
        self.history.present().clone()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
    }

    pub fn file_uri(&self) -> Option<&str> {
        self.file_uri.as_deref()
    }

    pub fn set_file_uri(&mut self, uri: Option<String>) {
        self.file_uri = uri;
    }

    /// Serialized form of the present document.
    pub fn current_text(&self) -> String {
        to_json_text(self.document())
    }

    pub fn is_dirty(&self) -> bool {
        self.current_text() != self.baseline_text
    }

    /// Advance the baseline to the present document (after save/download).
    pub fn mark_saved(&mut self) {
        self.baseline_text = self.current_text();
    }

    /// Deep-copy the present document, apply `mutate`, and commit the copy
    /// when `mutate` reports a change. Returns whether a version was committed.
    pub fn update<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut RoutingDocument) -> bool,
    {
        let mut draft = RoutingDocument::clone(self.history.present());
        if !mutate(&mut draft) {
            return false;
        }
        self.commit(Arc::new(draft))
    }

    /// Commit a whole document as the next version.
    pub fn set_document(&mut self, next: RoutingDocument) -> bool {
        self.commit(Arc::new(next))
    }

    fn commit(&mut self, next: Arc<RoutingDocument>) -> bool {
        let changed = self.history.set(next);
        if changed {
            self.sync_raw_from_state();
            tracing::debug!(
                "committed document version (undo depth={})",
                self.history.past_len()
            );
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.sync_raw_from_state();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.sync_raw_from_state();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Start over from the starter document, dropping history and file identity.
    pub fn new_file(&mut self) {
        let doc = starter_document();
        self.baseline_text = to_json_text(&doc);
        self.history.reset(Arc::new(doc));
        self.file_name = STARTER_FILE_NAME.to_string();
        self.file_uri = None;
        self.sync_raw_from_state();
        tracing::info!("started a new routing document");
    }

    /// Replace the document with parsed `text`, discarding history.
    ///
    /// On failure the current document is kept; `text` becomes the raw draft
    /// and the error message the raw error.
    pub fn load_from_text(
        &mut self,
        text: &str,
        name: Option<&str>,
        opts: LoadOptions,
    ) -> Result<(), ParseError> {
        self.file_name = name.unwrap_or(FALLBACK_FILE_NAME).to_string();
        if let Some(uri) = opts.file_uri {
            self.file_uri = uri;
        }
        match parse_document(text) {
            Ok(doc) => {
                self.history.reset(Arc::new(doc));
                self.sync_raw_from_state();
                if opts.mark_saved {
                    self.mark_saved();
                }
                tracing::info!("loaded {}", self.file_name);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to load {}: {}", self.file_name, e);
                self.raw_draft = text.to_string();
                self.raw_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn raw_draft(&self) -> &str {
        &self.raw_draft
    }

    pub fn raw_error(&self) -> Option<&str> {
        self.raw_error.as_deref()
    }

    pub fn set_raw_draft(&mut self, text: impl Into<String>) {
        self.raw_draft = text.into();
    }

    /// Load the raw draft as the document, keeping the current file name.
    pub fn apply_raw_draft(&mut self) -> Result<(), ParseError> {
        let text = self.raw_draft.clone();
        let name = self.file_name.clone();
        self.load_from_text(&text, Some(&name), LoadOptions::default())
    }

    fn sync_raw_from_state(&mut self) {
        self.raw_draft = self.current_text();
        self.raw_error = None;
    }

    /// Integrity issues of the present document, recomputed on every call.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        validate_routing(self.document())
    }

    pub fn status(&self) -> IssueStatus {
        IssueStatus::of(&self.issues())
    }

    /// Suggestions from the class's configured rules; empty when it has none.
    pub fn suggestions_for_class(&self, class: &str) -> Vec<String> {
        let rules = self.ui_config.rules_for(class);
        if rules.is_empty() {
            return Vec::new();
        }
        suggest_models_for_class(self.document(), rules)
    }

    pub fn ui_config(&self) -> &UiConfig {
        &self.ui_config
    }

    /// Replace the UI config and persist it right away. Store failures are
    /// logged and otherwise ignored; the in-memory config still changes.
    pub fn save_ui_config(&mut self, next: UiConfig) {
        if let Err(e) = self.store.save(&next) {
            tracing::warn!("failed to persist ui config: {}", e);
        }
        self.ui_config = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate;
    use crate::suggest::ClassRule;
    use crate::uiconfig::MemoryUiConfigStore;

    fn editor() -> RoutingEditor {
        RoutingEditor::new(Box::new(MemoryUiConfigStore::new()))
    }

    #[test]
    fn starts_clean_on_starter() {
        let ed = editor();
        assert_eq!(ed.file_name(), STARTER_FILE_NAME);
        assert!(!ed.is_dirty());
        assert!(!ed.can_undo());
        assert!(ed.issues().is_empty());
        assert_eq!(ed.raw_draft(), ed.current_text());
    }

    #[test]
    fn update_commits_a_distinct_snapshot() {
        let mut ed = editor();
        let before = ed.snapshot();
        assert!(ed.update(|d| mutate::add_class(d, "long")));
        assert!(!Arc::ptr_eq(&before, &ed.snapshot()));
        assert!(before.classes.get("long").is_none(), "stored snapshot mutated");
        assert!(ed.is_dirty());
        assert!(ed.raw_draft().contains("\"long\""));
    }

    #[test]
    fn no_op_update_records_nothing() {
        let mut ed = editor();
        assert!(!ed.update(|d| mutate::add_class(d, "default")));
        assert!(!ed.can_undo());
    }

    #[test]
    fn undo_back_to_baseline_is_clean() {
        let mut ed = editor();
        ed.update(|d| mutate::set_provider_enabled(d, "openai", false));
        assert!(ed.is_dirty());
        assert_eq!(ed.status().errors, 1);
        assert!(ed.undo());
        assert!(!ed.is_dirty());
        assert!(ed.redo());
        assert!(ed.is_dirty());
        ed.mark_saved();
        assert!(!ed.is_dirty());
    }

    #[test]
    fn failed_load_keeps_document() {
        let mut ed = editor();
        ed.update(|d| mutate::add_class(d, "long"));
        let before = ed.snapshot();
        let err = ed.load_from_text("{", Some("broken.json"), LoadOptions::default());
        assert!(matches!(err, Err(ParseError::InvalidJson(_))));
        assert!(Arc::ptr_eq(&before, &ed.snapshot()));
        assert!(ed.can_undo());
        assert_eq!(ed.raw_draft(), "{");
        assert!(ed.raw_error().is_some_and(|e| e.starts_with("Invalid JSON")));
    }

    #[test]
    fn load_resets_history_and_optionally_baseline() {
        let mut ed = editor();
        ed.update(|d| mutate::add_class(d, "long"));
        let mut doc = starter_document();
        mutate::add_provider(&mut doc, "anthropic");
        let text = to_json_text(&doc);

        ed.load_from_text(&text, Some("a.routing.json"), LoadOptions::default())
            .expect("load");
        assert!(!ed.can_undo());
        assert!(ed.is_dirty(), "baseline untouched without mark_saved");

        ed.load_from_text(
            &text,
            None,
            LoadOptions {
                file_uri: Some(Some("file:///a.routing.json".into())),
                mark_saved: true,
            },
        )
        .expect("load");
        assert!(!ed.is_dirty());
        assert_eq!(ed.file_name(), FALLBACK_FILE_NAME);
        assert_eq!(ed.file_uri(), Some("file:///a.routing.json"));
    }

    #[test]
    fn raw_draft_round_trip() {
        let mut ed = editor();
        let mut doc = starter_document();
        mutate::add_model(&mut doc, "openai:o3");
        ed.set_raw_draft(to_json_text(&doc));
        ed.apply_raw_draft().expect("apply");
        assert!(ed.document().models.contains_key("openai:o3"));
        assert_eq!(ed.file_name(), STARTER_FILE_NAME);

        ed.set_raw_draft("[]");
        assert!(matches!(
            ed.apply_raw_draft(),
            Err(ParseError::SchemaViolation { .. })
        ));
        assert_eq!(ed.raw_error(), Some("Schema validation failed."));
    }

    #[test]
    fn new_file_discards_history_and_identity() {
        let mut ed = editor();
        ed.set_file_uri(Some("file:///x.json".into()));
        ed.update(|d| mutate::add_class(d, "long"));
        ed.new_file();
        assert!(!ed.can_undo());
        assert!(!ed.is_dirty());
        assert_eq!(ed.file_uri(), None);
        assert_eq!(ed.document(), &starter_document());
    }

    #[test]
    fn suggestions_follow_class_rules() {
        let mut ed = editor();
        assert!(ed.suggestions_for_class("frontier").is_empty());

        let mut cfg = ed.ui_config().clone();
        if let Some(meta) = cfg.class_meta.get_mut("frontier") {
            meta.rules = Some(vec![ClassRule::tag("frontier")]);
        }
        ed.save_ui_config(cfg);
        assert_eq!(ed.suggestions_for_class("frontier"), vec!["openai:gpt-5.1"]);

        let ids = ed.suggestions_for_class("frontier");
        assert!(ed.update(|d| mutate::apply_suggestions(d, "frontier", ids)));
        assert_eq!(ed.document().classes["frontier"], vec!["openai:gpt-5.1".to_string()]);
    }

    #[test]
    fn ui_config_persists_through_store() {
        let store = MemoryUiConfigStore::new();
        let mut cfg = crate::uiconfig::default_ui_config();
        cfg.metric_definitions.truncate(1);
        store.save(&cfg).expect("save");
        let ed = RoutingEditor::new(Box::new(store));
        assert_eq!(ed.ui_config().metric_definitions.len(), 1);
    }
}
