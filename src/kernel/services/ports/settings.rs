use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_QUICK_OPEN_LIMIT: usize = 50;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default = "default_quick_open_limit")]
    pub quick_open_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchSettings::default(),
            quick_open_limit: DEFAULT_QUICK_OPEN_LIMIT,
        }
    }
}

fn default_quick_open_limit() -> usize {
    DEFAULT_QUICK_OPEN_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Honour `.gitignore` / `.ignore` files while walking.
    pub respect_gitignore: bool,
    pub skip_hidden: bool,
    /// Emit a progress message every N searched files.
    pub progress_interval: usize,
    /// Cancel the running scan when a new search starts.
    pub cancel_superseded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            respect_gitignore: false,
            skip_hidden: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cancel_superseded: false,
            max_file_size: None,
        }
    }
}

/// Project folder and open tabs, restored on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<PathBuf>,
    #[serde(default)]
    pub open_tabs: Vec<PathBuf>,
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
