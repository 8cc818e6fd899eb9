use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::theme::{PaletteOverrides, PreferenceStore};

const DEFAULT_SCHEME_POLL_MS: u64 = 2000;

/// Key holding the persisted theme preference.
const THEME_KEY: &str = "theme";

#[derive(Debug, Clone)]
pub struct DifferConfig {
    pub path: PathBuf,
    pub context_lines: Option<u32>,
    pub scheme_poll: Duration,
    pub colors: PaletteOverrides,
}

impl DifferConfig {
    fn defaults(path: PathBuf) -> Self {
        Self {
            path,
            context_lines: None,
            scheme_poll: Duration::from_millis(DEFAULT_SCHEME_POLL_MS),
            colors: PaletteOverrides::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    context_lines: Option<u32>,
    #[serde(default)]
    scheme_poll_ms: Option<u64>,
    #[serde(default)]
    colors: Option<PaletteOverrides>,
}

/// `$XDG_CONFIG_HOME/differ/config.toml`, falling back to
/// `~/.config/differ/config.toml`.
pub fn config_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("differ").join("config.toml")
}

/// Load config from `path`, falling back to defaults when the file is missing
/// or unparseable. The `theme` key is not read here; it belongs to
/// [`ConfigPreferences`].
pub fn load_config(path: &Path) -> DifferConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return DifferConfig::defaults(path.to_path_buf()),
    };

    let file: ConfigFile = match toml::from_str(&contents) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), "ignoring unparseable config: {e}");
            return DifferConfig::defaults(path.to_path_buf());
        }
    };

    DifferConfig {
        path: path.to_path_buf(),
        context_lines: file.context_lines,
        scheme_poll: Duration::from_millis(
            file.scheme_poll_ms
                .unwrap_or(DEFAULT_SCHEME_POLL_MS)
                .max(100),
        ),
        colors: file.colors.unwrap_or_default(),
    }
}

/// Theme preference persisted as the `theme` key of config.toml.
pub struct ConfigPreferences {
    path: PathBuf,
}

impl ConfigPreferences {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_table(&self) -> toml::Table {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| contents.parse::<toml::Table>().ok())
            .unwrap_or_default()
    }
}

impl PreferenceStore for ConfigPreferences {
    fn load(&self) -> Option<String> {
        self.read_table()
            .get(THEME_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Rewrites only the `theme` key, preserving the rest of the file.
    fn save(&mut self, value: &str) -> Result<()> {
        let mut table = self.read_table();
        table.insert(THEME_KEY.to_string(), toml::Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(&table).context("Failed to serialize config")?;
        std::fs::write(&self.path, toml_string)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
