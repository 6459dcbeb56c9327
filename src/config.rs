//! Layered configuration for autotag
//!
//! Sources, lowest precedence first:
//! 1. Compiled defaults
//! 2. TOML file (`--config`, else `<config_dir>/autotag/config.toml` if present)
//! 3. `AUTOTAG_*` environment variables (`AUTOTAG_DEBOUNCE_MS=500`)
//!
//! Command-line flags override the resolved file locations.

use crate::error::Result;
use config::{Config, Environment, File, FileFormat, FileSourceFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const APP_DIR: &str = "autotag";

fn default_extension() -> String {
    "md".to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_discover_limit() -> usize {
    20
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base directory for the rules, aliases and watcher state files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub rules_file: Option<PathBuf>,

    #[serde(default)]
    pub aliases_file: Option<PathBuf>,

    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Tracked document extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_discover_limit")]
    pub discover_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            rules_file: None,
            aliases_file: None,
            state_file: None,
            extension: default_extension(),
            debounce_ms: default_debounce_ms(),
            discover_limit: default_discover_limit(),
        }
    }
}

/// `<config_dir>/autotag/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

impl Settings {
    /// Load settings; an explicit `config_path` must exist and parse
    ///
    /// A corrupt file at the default location is skipped with a warning.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::build(Some(File::from(path).format(FileFormat::Toml).required(true)))
            }
            None => Self::load_default(default_config_path()),
        }
    }

    fn load_default(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            return Self::build(None);
        };
        match Self::build(Some(File::from(path.as_path()).format(FileFormat::Toml).required(false))) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::build(None)
            }
        }
    }

    fn build(file: Option<File<FileSourceFile, FileFormat>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("extension", default_extension())?
            .set_default("debounce_ms", default_debounce_ms())?
            .set_default("discover_limit", default_discover_limit() as u64)?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("AUTOTAG").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        self.extension = self.extension.trim().trim_start_matches('.').to_string();
        if self.extension.is_empty() {
            self.extension = default_extension();
        }
        self
    }

    /// `data_dir`, else the platform data directory, else `./.autotag`
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".autotag"))
    }

    /// Rules file: flag, then setting, then `<data_dir>/rules.json`
    pub fn rules_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.rules_file.clone())
            .unwrap_or_else(|| self.data_dir().join("rules.json"))
    }

    pub fn aliases_path(&self) -> PathBuf {
        self.aliases_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("aliases.json"))
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("watch-state.json"))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
