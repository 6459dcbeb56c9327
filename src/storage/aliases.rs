//! Named directory aliases
//!
//! `{aliases: {name: path}, default?}` in a JSON file. Commands that take an
//! optional alias resolve it here: explicit alias, then an existing directory
//! path, then the default alias, then the current directory.

use super::{atomic_write, load_json_or_default};
use crate::error::{AutotagError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

static ALIAS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Valid alias name regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AliasDocument {
    #[serde(default)]
    aliases: BTreeMap<String, PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

pub struct AliasStore {
    path: PathBuf,
    doc: AliasDocument,
}

impl AliasStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let doc = load_json_or_default(&path, "aliases");
        Self { path, doc }
    }

    pub fn list(&self) -> &BTreeMap<String, PathBuf> {
        &self.doc.aliases
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.doc.aliases.get(name).map(PathBuf::as_path)
    }

    pub fn default_alias(&self) -> Option<&str> {
        self.doc.default.as_deref()
    }

    /// Register or repoint an alias; relative paths are made absolute
    pub fn set(&mut self, name: &str, dir: &Path, make_default: bool) -> Result<()> {
        if !ALIAS_NAME.is_match(name) {
            return Err(AutotagError::Validation(vec![format!(
                "invalid alias name '{}' (allowed: letters, digits, _ -)",
                name
            )]));
        }
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };

        self.doc.aliases.insert(name.to_string(), dir.clone());
        if make_default || self.doc.default.is_none() {
            self.doc.default = Some(name.to_string());
        }
        self.persist()?;
        info!("Alias {} -> {}", name, dir.display());
        Ok(())
    }

    /// Remove an alias, clearing the default if it pointed here
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.doc.aliases.remove(name).is_none() {
            return Ok(false);
        }
        if self.doc.default.as_deref() == Some(name) {
            self.doc.default = None;
        }
        self.persist()?;
        Ok(true)
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.doc.aliases.contains_key(name) {
            return Err(AutotagError::UnknownAlias(name.to_string()));
        }
        self.doc.default = Some(name.to_string());
        self.persist()
    }

    /// Directory for an optional alias argument
    pub fn resolve(&self, alias: Option<&str>) -> Result<PathBuf> {
        match alias {
            Some(name) => {
                if let Some(dir) = self.get(name) {
                    return Ok(dir.to_path_buf());
                }
                let as_path = Path::new(name);
                if as_path.is_dir() {
                    return Ok(as_path.to_path_buf());
                }
                Err(AutotagError::UnknownAlias(name.to_string()))
            }
            None => match self.doc.default.as_deref().and_then(|d| self.get(d)) {
                Some(dir) => Ok(dir.to_path_buf()),
                None => Ok(std::env::current_dir()?),
            },
        }
    }

    fn persist(&self) -> Result<()> {
        atomic_write(&self.path, &serde_json::to_vec_pretty(&self.doc)?)
    }
}
