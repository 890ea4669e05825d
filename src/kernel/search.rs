//! 搜索结果存储
//!
//! Collects the streamed `GlobalSearchMessage`s of the active search and,
//! when replace mode is armed, re-resolves every record against the files as
//! they are now.

use crate::kernel::services::adapters::search::CompiledPattern;
use crate::kernel::services::ports::file::FileProvider;
use crate::kernel::services::ports::search::{
    FileMatches, GlobalSearchMessage, LineMatch, MatchRecord, SearchOptions,
};
use crate::models::TextBuffer;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SearchFileResult {
    pub path: PathBuf,
    pub matches: Vec<LineMatch>,
}

/// Stable reference to one result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchHandle {
    pub file_index: usize,
    pub match_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub display_path: String,
    pub line: usize,
    pub snippet: String,
    pub handle: MatchHandle,
}

#[derive(Debug, Default)]
pub struct MatchStore {
    root: PathBuf,
    query: String,
    options: SearchOptions,
    matcher: Option<CompiledPattern>,
    active_search_id: Option<u64>,
    searching: bool,
    complete: bool,
    cancelled: bool,
    files_searched: usize,
    files_with_matches: usize,
    total_matches: usize,
    files: Vec<SearchFileResult>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops previous results and starts collecting for a new query.
    pub fn begin(
        &mut self,
        root: &Path,
        query: &str,
        options: SearchOptions,
        matcher: CompiledPattern,
    ) {
        self.clear();
        self.root = root.to_path_buf();
        self.query = query.to_string();
        self.options = options;
        self.matcher = Some(matcher);
        self.searching = true;
    }

    pub fn set_active_search_id(&mut self, search_id: u64) -> bool {
        if self.active_search_id == Some(search_id) {
            return false;
        }
        self.active_search_id = Some(search_id);
        true
    }

    pub fn active_search_id(&self) -> Option<u64> {
        self.active_search_id
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.options = SearchOptions::default();
        self.matcher = None;
        self.active_search_id = None;
        self.searching = false;
        self.complete = false;
        self.cancelled = false;
        self.files_searched = 0;
        self.files_with_matches = 0;
        self.total_matches = 0;
        self.files.clear();
    }

    /// Returns true if the message belonged to the active search and changed
    /// the store.
    pub fn apply_message(&mut self, msg: GlobalSearchMessage) -> bool {
        if self.active_search_id != Some(msg.search_id()) {
            return false;
        }

        match msg {
            GlobalSearchMessage::FileMatches {
                file_matches: FileMatches { path, matches },
                ..
            } => {
                if matches.is_empty() {
                    return false;
                }
                self.total_matches += matches.len();
                // 大文件的结果分多条消息到达，接在同一个文件后面
                match self.files.last_mut() {
                    Some(last) if last.path == path => last.matches.extend(matches),
                    _ => {
                        self.files_with_matches += 1;
                        self.files.push(SearchFileResult { path, matches });
                    }
                }
                true
            }
            GlobalSearchMessage::Progress {
                files_searched,
                files_with_matches,
                ..
            } => {
                let changed = self.files_searched != files_searched
                    || self.files_with_matches != files_with_matches;
                self.files_searched = files_searched;
                self.files_with_matches = files_with_matches;
                changed
            }
            GlobalSearchMessage::Complete {
                total_files,
                total_matches,
                cancelled,
                ..
            } => {
                let changed = self.searching || !self.complete;
                self.searching = false;
                self.complete = true;
                self.cancelled = cancelled;
                self.files_searched = total_files;
                self.total_matches = total_matches;
                changed
            }
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn matcher(&self) -> Option<&CompiledPattern> {
        self.matcher.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn files_searched(&self) -> usize {
        self.files_searched
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[SearchFileResult] {
        &self.files
    }

    /// All records in result order: files in arrival order, lines ascending.
    pub fn records(&self) -> Vec<MatchRecord> {
        self.files
            .iter()
            .flat_map(|file| {
                file.matches
                    .iter()
                    .map(|m| MatchRecord::new(&file.path, m.line, m.column, m.length))
            })
            .collect()
    }

    pub fn record(&self, handle: MatchHandle) -> Option<MatchRecord> {
        let file = self.files.get(handle.file_index)?;
        let m = file.matches.get(handle.match_index)?;
        Some(MatchRecord::new(&file.path, m.line, m.column, m.length))
    }

    /// Flat result list for display. Paths are shown relative to the root.
    pub fn items(&self) -> Vec<ResultItem> {
        let mut items = Vec::with_capacity(self.total_matches);
        for (file_index, file) in self.files.iter().enumerate() {
            let display_path = self.display_path(&file.path);
            for (match_index, m) in file.matches.iter().enumerate() {
                items.push(ResultItem {
                    display_path: display_path.clone(),
                    line: m.line,
                    snippet: m.snippet.clone(),
                    handle: MatchHandle {
                        file_index,
                        match_index,
                    },
                });
            }
        }
        items
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Re-resolves every record against the current file contents. Each file
    /// is read once. A record keeps its column when the pattern still starts
    /// there, otherwise it moves to the first hit of its line; records whose
    /// file, line or match is gone are dropped.
    pub fn arm_snapshot(&self, files: &dyn FileProvider) -> Vec<MatchRecord> {
        let Some(matcher) = self.matcher.as_ref() else {
            return Vec::new();
        };

        let mut snapshot = Vec::with_capacity(self.total_matches);
        for file in &self.files {
            let text = match files.read_text(&file.path) {
                Ok(text) => TextBuffer::from_text(&text),
                Err(e) => {
                    tracing::debug!(
                        path = %file.path.display(),
                        error = %e,
                        dropped = file.matches.len(),
                        "stale match: file unreadable"
                    );
                    continue;
                }
            };

            for m in &file.matches {
                let Some(line) = m.line.checked_sub(1).and_then(|row| text.line(row)) else {
                    tracing::debug!(path = %file.path.display(), line = m.line, "stale match: line gone");
                    continue;
                };
                let hit = matcher
                    .find_at(&line, m.column)
                    .or_else(|| matcher.search(&line));
                match hit {
                    Some(hit) => snapshot.push(MatchRecord::new(
                        &file.path,
                        m.line,
                        hit.column,
                        hit.length,
                    )),
                    None => {
                        tracing::debug!(path = %file.path.display(), line = m.line, "stale match: no longer matches")
                    }
                }
            }
        }
        snapshot
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
