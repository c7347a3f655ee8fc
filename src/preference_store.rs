use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::preferences::Preferences;

/// Persists preferences as a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored preferences, or defaults on first run. An unreadable
    /// or corrupt file also yields defaults, which the next save overwrites.
    pub fn load(&self) -> Preferences {
        match self.try_load() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => {
                debug!(path = %self.path.display(), "no stored preferences, using defaults");
                Preferences::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stored preferences unreadable, using defaults");
                Preferences::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<Preferences>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences from {:?}", self.path))?;
        let prefs = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences in {:?}", self.path))?;
        Ok(Some(prefs))
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create preferences directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences to {:?}", self.path))?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}
