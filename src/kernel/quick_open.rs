//! Quick open: substring filter over the project's files.

use crate::kernel::services::adapters::search::FileWalker;
use crate::kernel::services::ports::search::SearchOptions;
use crate::kernel::services::ports::settings::DEFAULT_QUICK_OPEN_LIMIT;
use std::path::{Path, PathBuf};

pub const QUICK_OPEN_LIMIT: usize = DEFAULT_QUICK_OPEN_LIMIT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickOpenEntry {
    /// Path relative to the project root, `/` separated.
    pub relative: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct QuickOpen {
    root: Option<PathBuf>,
    entries: Vec<(String, QuickOpenEntry)>,
}

impl QuickOpen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-lists every file under `root`.
    pub fn refresh(&mut self, root: &Path) {
        let walker = FileWalker::new(root, &SearchOptions::default());
        self.entries = walker
            .files()
            .filter_map(|path| {
                let relative = path
                    .strip_prefix(root)
                    .ok()?
                    .to_string_lossy()
                    .replace('\\', "/");
                Some((relative.to_lowercase(), QuickOpenEntry { relative, path }))
            })
            .collect();
        self.root = Some(root.to_path_buf());
        tracing::debug!(root = %root.display(), files = self.entries.len(), "quick open index refreshed");
    }

    /// Case-insensitive substring match, in path order, at most `limit`
    /// entries. An empty query lists nothing.
    pub fn filter(&self, query: &str, limit: usize) -> Vec<QuickOpenEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|(key, _)| key.contains(&query))
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/quick_open.rs"]
mod tests;
