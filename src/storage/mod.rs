//! Storage layer for autotag
//!
//! JSON-file persistence for rules, directory aliases and watcher state. All
//! stores write through [`atomic_write`] and load fail-open: a missing or
//! corrupt file yields an empty store.

pub mod aliases;
pub mod rules;

pub use aliases::AliasStore;
pub use rules::{slugify, RuleStore};

use crate::error::Result;
use crate::types::Rule;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Source of the current rule set
///
/// The watch loop asks for rules once per processed file so that edits to the
/// rules file take effect without a restart.
pub trait RuleProvider: Send + Sync {
    fn load_rules(&self) -> Result<Vec<Rule>>;
}

/// Reads rules from a rules file on every call
#[derive(Debug, Clone)]
pub struct RuleFile {
    path: PathBuf,
}

impl RuleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleProvider for RuleFile {
    fn load_rules(&self) -> Result<Vec<Rule>> {
        Ok(RuleStore::open(&self.path).rules().to_vec())
    }
}

/// A fixed rule set
impl RuleProvider for Vec<Rule> {
    fn load_rules(&self) -> Result<Vec<Rule>> {
        Ok(self.clone())
    }
}

/// Write `bytes` to a uniquely named sibling temp file, then rename over `path`
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "autotag".to_string());
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Load a JSON document, falling back to `T::default()` with a logged warning
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => T::default(),
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring corrupt {} file {}: {}", what, path.display(), e);
                T::default()
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No {} file at {}, starting empty", what, path.display());
            T::default()
        }
        Err(e) => {
            warn!("Cannot read {} file {}: {}", what, path.display(), e);
            T::default()
        }
    }
}
