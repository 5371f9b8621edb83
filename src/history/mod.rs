use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HISTORY_FILE: &str = "history.json";
pub const MAX_HISTORY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default = "unknown_title")]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

fn unknown_title() -> String {
    "Unknown".to_string()
}

/// Move `entry` to the front, dropping any older entry with the same url
/// and anything past `MAX_HISTORY`.
pub fn push_entry(mut entries: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    entries.retain(|existing| existing.url != entry.url);
    entries.insert(0, entry);
    entries.truncate(MAX_HISTORY);
    entries
}

/// The last few processed links, kept in a small JSON file. Read and write
/// failures never surface to the caller.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Ignoring unreadable history at {}: {:#}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        let entries = serde_json::from_str(&data).context("History is not a list of entries")?;
        Ok(entries)
    }

    pub fn add(&self, title: &str, url: &str) {
        let entries = push_entry(
            self.load(),
            HistoryEntry {
                title: title.to_string(),
                url: url.to_string(),
            },
        );

        if let Err(e) = self.save(&entries) {
            warn!("Could not save history to {}: {:#}", self.path.display(), e);
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
