//! Persistence for the UI config sidecar.
//!
//! The blob is stored under a single well-known key. Loading never fails:
//! anything absent, unreadable or malformed falls back to the defaults.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::default::default_ui_config;
use super::types::UiConfig;

/// Key the UI config blob is stored under.
pub const UI_CONFIG_KEY: &str = "routing-studio.ui-config.v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ui config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ui config encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("ui config persist error: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Load/save capability handed to the editor; callers decide when to call it.
pub trait UiConfigStore: Send {
    fn load(&self) -> UiConfig;
    fn save(&self, cfg: &UiConfig) -> Result<(), StoreError>;
}

/// Decode a stored blob, rejecting it when required top-level fields are missing.
pub fn decode_ui_config(raw: &str) -> Option<UiConfig> {
    let v: JsonValue = serde_json::from_str(raw).ok()?;
    let has_metrics = v
        .get("metricDefinitions")
        .and_then(|m| m.as_array())
        .is_some_and(|m| !m.is_empty());
    if !has_metrics || v.get("classMeta").is_none() {
        return None;
    }
    serde_json::from_value(v).ok()
}

/// Stores the blob as `<dir>/<key>.json`, replacing it atomically.
#[derive(Debug, Clone)]
pub struct FileUiConfigStore {
    dir: PathBuf,
}

impl FileUiConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{UI_CONFIG_KEY}.json"))
    }

    fn read(path: &Path) -> Option<UiConfig> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("failed to read ui config {}: {}", path.display(), e);
                return None;
            }
        };
        let cfg = decode_ui_config(&raw);
        if cfg.is_none() {
            tracing::warn!(
                "ignoring malformed ui config {} (using defaults)",
                path.display()
            );
        }
        cfg
    }
}

impl UiConfigStore for FileUiConfigStore {
    fn load(&self) -> UiConfig {
        Self::read(&self.path()).unwrap_or_else(default_ui_config)
    }

    fn save(&self, cfg: &UiConfig) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let blob = serde_json::to_vec(cfg)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&blob)?;
        tmp.persist(self.path())?;
        tracing::debug!("saved ui config to {}", self.path().display());
        Ok(())
    }
}

/// Keeps the blob in memory; used when no store directory is configured.
#[derive(Debug, Default)]
pub struct MemoryUiConfigStore {
    blob: Mutex<Option<String>>,
}

impl MemoryUiConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw blob, as if written by an earlier session.
    pub fn with_blob(raw: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(raw.into())),
        }
    }
}

impl UiConfigStore for MemoryUiConfigStore {
    fn load(&self) -> UiConfig {
        let guard = match self.blob.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .as_deref()
            .and_then(decode_ui_config)
            .unwrap_or_else(default_ui_config)
    }

    fn save(&self, cfg: &UiConfig) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cfg)?;
        let mut guard = match self.blob.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(raw);
        Ok(())
    }
}
