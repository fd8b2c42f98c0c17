use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub editor: Option<EditorCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorCfg {
    /// Quiet period before document text is pushed to the host.
    pub debounce_ms: Option<u64>,
    /// Directory holding the UI config sidecar; `~/` is expanded.
    pub ui_config_dir: Option<String>,
}

impl UserConfig {
    pub fn debounce_ms(&self) -> u64 {
        self.editor
            .as_ref()
            .and_then(|e| e.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn ui_config_dir(&self) -> Option<PathBuf> {
        self.editor
            .as_ref()
            .and_then(|e| e.ui_config_dir.as_deref())
            .map(expand_home)
    }
}

/// Resolve the home directory: explicit value, then `$HOME/.routing-studio`,
/// then `./.routing-studio`.
pub fn resolve_home(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        return expand_home(explicit);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".routing-studio");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".routing-studio")
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}
