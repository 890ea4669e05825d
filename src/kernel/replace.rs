//! Interactive replace: one snapshot entry per step.
//!
//! Every step re-checks its entry against the file as it is now. Positions
//! are shifted by the edits this session already made to the same file, and
//! the pattern must still start at the shifted column, otherwise the entry
//! is dropped and the next one is tried.

use crate::kernel::services::adapters::search::CompiledPattern;
use crate::kernel::services::ports::file::{FileError, FileProvider};
use crate::kernel::services::ports::search::MatchRecord;
use crate::kernel::views::{ViewCoordinator, ViewError, ViewId};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ReplaceError {
    /// Replace mode is not armed.
    NotArmed,
    /// The edited file could not be written. The edit was rolled back and
    /// the entry stays current.
    Persist { path: PathBuf, source: FileError },
    View(ViewError),
}

impl std::fmt::Display for ReplaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceError::NotArmed => write!(f, "Replace mode is not armed"),
            ReplaceError::Persist { path, source } => {
                write!(f, "Could not save {}: {}", path.display(), source)
            }
            ReplaceError::View(e) => write!(f, "View error: {}", e),
        }
    }
}

impl std::error::Error for ReplaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplaceError::Persist { source, .. } => Some(source),
            ReplaceError::View(e) => Some(e),
            ReplaceError::NotArmed => None,
        }
    }
}

impl From<ViewError> for ReplaceError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::Persist { path, source } => ReplaceError::Persist { path, source },
            other => ReplaceError::View(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceStep {
    /// One occurrence was replaced and saved; more entries remain.
    Replaced(MatchRecord),
    /// The snapshot is exhausted. Returned exactly once; `last` is the
    /// occurrence replaced by this call, if any.
    Completed {
        last: Option<MatchRecord>,
        replaced: usize,
    },
    /// The session already completed.
    Idle,
}

/// An edit made by this session, in the coordinates of the file at the
/// time it was made.
#[derive(Debug, Clone)]
struct AppliedEdit {
    path: PathBuf,
    line: usize,
    column: usize,
    removed: usize,
    inserted: String,
}

impl AppliedEdit {
    /// Maps a (1-based line, char column) position that lay behind this edit
    /// to where it is after the edit.
    fn shift(&self, line: usize, column: usize) -> (usize, usize) {
        let newlines = self.inserted.matches('\n').count();
        if self.line < line {
            return (line + newlines, column);
        }
        if self.line > line || self.column + self.removed > column {
            return (line, column);
        }

        let tail = column - (self.column + self.removed);
        if newlines == 0 {
            (line, self.column + self.inserted.chars().count() + tail)
        } else {
            let last_segment = self.inserted.rsplit('\n').next().unwrap_or("");
            (line + newlines, last_segment.chars().count() + tail)
        }
    }
}

pub struct ReplaceSession {
    matcher: CompiledPattern,
    snapshot: Vec<MatchRecord>,
    cursor: usize,
    edits: Vec<AppliedEdit>,
    follow_view: Option<ViewId>,
    replaced: usize,
    finished: bool,
}

impl ReplaceSession {
    pub fn new(matcher: CompiledPattern, snapshot: Vec<MatchRecord>) -> Self {
        Self {
            matcher,
            snapshot,
            cursor: 0,
            edits: Vec::new(),
            follow_view: None,
            replaced: 0,
            finished: false,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn snapshot(&self) -> &[MatchRecord] {
        &self.snapshot
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.snapshot.len().saturating_sub(self.cursor)
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The view that shows the file of the last step.
    pub fn follow_view(&self) -> Option<ViewId> {
        self.follow_view
    }

    /// Replaces the next still-valid entry with `replacement` (literal text)
    /// and saves the file.
    pub fn step(
        &mut self,
        replacement: &str,
        views: &mut ViewCoordinator,
        files: &dyn FileProvider,
    ) -> Result<ReplaceStep, ReplaceError> {
        if self.finished {
            return Ok(ReplaceStep::Idle);
        }

        while let Some(record) = self.snapshot.get(self.cursor).cloned() {
            let (line, column) = self.shifted_position(&record);

            let Some(view) = self.follow(&record.path, views, files) else {
                self.skip_stale(&record, "file unreadable");
                continue;
            };
            let Some((start, length)) = self.locate(views, view, line, column) else {
                self.skip_stale(&record, "no longer matches");
                continue;
            };

            let before = views
                .buffer(view)
                .map(|b| b.rope().clone())
                .ok_or(ReplaceError::View(ViewError::UnknownView))?;
            views.edit(view, |buffer| {
                buffer.select(start..start + length);
                buffer.replace_selection(replacement);
            });

            if let Err(e) = views.save(view, files) {
                views.restore(view, before);
                tracing::warn!(path = %record.path.display(), line, error = %e, "replace rolled back");
                return Err(e.into());
            }

            self.edits.push(AppliedEdit {
                path: record.path.clone(),
                line,
                column,
                removed: length,
                inserted: replacement.to_string(),
            });
            self.replaced += 1;
            self.cursor += 1;

            let applied = MatchRecord::new(record.path, line, column, length);
            tracing::info!(
                path = %applied.path.display(),
                line,
                column,
                remaining = self.remaining(),
                "replaced"
            );

            if self.cursor >= self.snapshot.len() {
                return Ok(self.complete(Some(applied)));
            }
            return Ok(ReplaceStep::Replaced(applied));
        }

        Ok(self.complete(None))
    }

    fn complete(&mut self, last: Option<MatchRecord>) -> ReplaceStep {
        self.finished = true;
        tracing::info!(replaced = self.replaced, "all replacements complete");
        ReplaceStep::Completed {
            last,
            replaced: self.replaced,
        }
    }

    fn skip_stale(&mut self, record: &MatchRecord, reason: &str) {
        tracing::debug!(
            path = %record.path.display(),
            line = record.line,
            column = record.column,
            reason,
            "stale match dropped"
        );
        self.cursor += 1;
    }

    fn shifted_position(&self, record: &MatchRecord) -> (usize, usize) {
        self.edits
            .iter()
            .filter(|edit| edit.path == record.path)
            .fold((record.line, record.column), |(line, column), edit| {
                edit.shift(line, column)
            })
    }

    /// Shows `path` in the follow view, freshly loaded from disk.
    fn follow(
        &mut self,
        path: &Path,
        views: &mut ViewCoordinator,
        files: &dyn FileProvider,
    ) -> Option<ViewId> {
        if let Some(id) = self.follow_view {
            if views.views_for(path).contains(&id) {
                return views.reload(id, files).ok().map(|()| id);
            }
            views.close(id);
            self.follow_view = None;
        }

        let id = views.open(path, files).ok()?;
        self.follow_view = Some(id);
        Some(id)
    }

    /// Char range of the match starting at (line, column) in the view.
    fn locate(
        &self,
        views: &ViewCoordinator,
        view: ViewId,
        line: usize,
        column: usize,
    ) -> Option<(usize, usize)> {
        let buffer = views.buffer(view)?;
        let row = line.checked_sub(1)?;
        let text = buffer.line(row)?;
        let hit = self.matcher.find_at(&text, column)?;
        Some((buffer.line_to_char(row)? + hit.column, hit.length))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/replace.rs"]
mod tests;
