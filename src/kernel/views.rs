//! Open views and their synchronization.
//!
//! Every open view is either a plain editor or an editor paired with a
//! rendered preview. Views are indexed by file path so that a save can be
//! broadcast: the other views of that path reload from disk and every
//! preview of that path re-renders from the saved content.

use crate::kernel::preview::{Preview, PreviewKind};
use crate::kernel::services::adapters::autosave_path;
use crate::kernel::services::ports::file::{FileError, FileProvider};
use crate::models::TextBuffer;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::path::{Path, PathBuf};

new_key_type! {
    pub struct ViewId;
}

#[derive(Debug)]
pub enum ViewError {
    UnknownView,
    /// The view has no file path yet; use `save_as`.
    Untitled,
    Persist { path: PathBuf, source: FileError },
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::UnknownView => write!(f, "Unknown view"),
            ViewError::Untitled => write!(f, "View has no file path"),
            ViewError::Persist { path, source } => {
                write!(f, "Could not save {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorView {
    path: Option<PathBuf>,
    buffer: TextBuffer,
}

impl EditorView {
    pub fn new(path: Option<PathBuf>, buffer: TextBuffer) -> Self {
        Self { path, buffer }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }
}

#[derive(Debug, Clone)]
pub enum View {
    Plain(EditorView),
    DualPane { editor: EditorView, preview: Preview },
}

impl View {
    pub fn editor(&self) -> &EditorView {
        match self {
            View::Plain(editor) | View::DualPane { editor, .. } => editor,
        }
    }

    pub fn editor_mut(&mut self) -> &mut EditorView {
        match self {
            View::Plain(editor) | View::DualPane { editor, .. } => editor,
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        match self {
            View::Plain(_) => None,
            View::DualPane { preview, .. } => Some(preview),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.editor().path()
    }

    /// Re-renders the preview if the buffer changed since the last render.
    fn sync_preview(&mut self, force: bool) -> bool {
        let View::DualPane { editor, preview } = self else {
            return false;
        };
        let version = editor.buffer.version();
        if !force && !preview.is_stale(version) {
            return false;
        }
        preview.render(&editor.buffer.text(), version);
        true
    }
}

/// The path a view is bound under: canonical when it resolves, otherwise the
/// canonical parent joined with the file name, otherwise `path` unchanged.
fn binding_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// path → open views. A lookup index only; views are owned by the coordinator.
#[derive(Debug, Default)]
pub struct ViewBindings {
    by_path: FxHashMap<PathBuf, Vec<ViewId>>,
}

impl ViewBindings {
    pub fn bind(&mut self, path: &Path, id: ViewId) {
        let ids = self.by_path.entry(path.to_path_buf()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn unbind(&mut self, path: &Path, id: ViewId) {
        if let Some(ids) = self.by_path.get_mut(path) {
            ids.retain(|v| *v != id);
            if ids.is_empty() {
                self.by_path.remove(path);
            }
        }
    }

    pub fn views_for(&self, path: &Path) -> &[ViewId] {
        self.by_path.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.by_path.clear();
    }
}

#[derive(Default)]
pub struct ViewCoordinator {
    views: SlotMap<ViewId, View>,
    bindings: ViewBindings,
    order: Vec<ViewId>,
}

impl ViewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(id)
    }

    pub fn buffer(&self, id: ViewId) -> Option<&TextBuffer> {
        self.views.get(id).map(|v| v.editor().buffer())
    }

    /// Views in tab order.
    pub fn ids(&self) -> &[ViewId] {
        &self.order
    }

    pub fn views_for(&self, path: &Path) -> &[ViewId] {
        self.bindings.views_for(&binding_key(path))
    }

    /// Paths of all open views in tab order, one entry per view.
    pub fn open_paths(&self) -> Vec<PathBuf> {
        self.order
            .iter()
            .filter_map(|id| self.views.get(*id).and_then(View::path))
            .map(Path::to_path_buf)
            .collect()
    }

    /// Opens a new view of `path`. Markdown and HTML files get a preview pane.
    pub fn open(&mut self, path: &Path, files: &dyn FileProvider) -> Result<ViewId, FileError> {
        let path = binding_key(path);
        let text = files.read_text(&path)?;
        let editor = EditorView::new(Some(path.clone()), TextBuffer::from_text(&text));
        let mut view = match PreviewKind::for_path(&path) {
            Some(kind) => View::DualPane {
                editor,
                preview: Preview::new(kind, Some(path.as_path())),
            },
            None => View::Plain(editor),
        };
        view.sync_preview(true);

        let id = self.insert(view);
        tracing::debug!(path = %path.display(), "view opened");
        Ok(id)
    }

    pub fn open_untitled(&mut self) -> ViewId {
        self.insert(View::Plain(EditorView::new(None, TextBuffer::new())))
    }

    /// Opens a second plain view on the same file with the same content,
    /// cursor and modified flag.
    pub fn split(&mut self, id: ViewId) -> Option<ViewId> {
        let editor = self.views.get(id)?.editor().clone();
        Some(self.insert(View::Plain(editor)))
    }

    fn insert(&mut self, view: View) -> ViewId {
        let path = view.path().map(Path::to_path_buf);
        let id = self.views.insert(view);
        if let Some(path) = path {
            self.bindings.bind(&path, id);
        }
        self.order.push(id);
        id
    }

    pub fn close(&mut self, id: ViewId) -> bool {
        let Some(view) = self.views.remove(id) else {
            return false;
        };
        if let Some(path) = view.path() {
            self.bindings.unbind(path, id);
        }
        self.order.retain(|v| *v != id);
        true
    }

    pub fn close_all(&mut self) {
        self.views.clear();
        self.bindings.clear();
        self.order.clear();
    }

    /// Runs an edit on the view's buffer. Previews pick the change up on the
    /// next `flush_previews`.
    pub fn edit<R>(&mut self, id: ViewId, f: impl FnOnce(&mut TextBuffer) -> R) -> Option<R> {
        let view = self.views.get_mut(id)?;
        Some(f(view.editor_mut().buffer_mut()))
    }

    /// Re-renders every preview whose buffer changed. Returns how many did.
    pub fn flush_previews(&mut self) -> usize {
        self.views
            .values_mut()
            .map(|v| v.sync_preview(false))
            .filter(|rendered| *rendered)
            .count()
    }

    /// Reloads one view from disk.
    pub fn reload(&mut self, id: ViewId, files: &dyn FileProvider) -> Result<(), FileError> {
        let Some(view) = self.views.get_mut(id) else {
            return Ok(());
        };
        let Some(path) = view.path().map(Path::to_path_buf) else {
            return Ok(());
        };
        let text = files.read_text(&path)?;
        view.editor_mut().buffer_mut().reload(&text);
        view.sync_preview(true);
        Ok(())
    }

    /// Puts a previous rope back into the view, leaving it unmodified.
    pub fn restore(&mut self, id: ViewId, rope: ropey::Rope) {
        if let Some(view) = self.views.get_mut(id) {
            view.editor_mut().buffer_mut().restore(rope);
            view.sync_preview(false);
        }
    }

    /// Persists the view's buffer, then brings every other view of the same
    /// path in line with what was written.
    pub fn save(&mut self, id: ViewId, files: &dyn FileProvider) -> Result<(), ViewError> {
        let view = self.views.get_mut(id).ok_or(ViewError::UnknownView)?;
        let path = view.path().map(Path::to_path_buf).ok_or(ViewError::Untitled)?;
        let text = view.editor().buffer().text();

        if let Err(source) = files.write_file(&path, &text) {
            tracing::warn!(path = %path.display(), error = %source, "save failed");
            return Err(ViewError::Persist { path, source });
        }
        view.editor_mut().buffer_mut().set_modified(false);
        view.sync_preview(false);

        let reloaded = self.broadcast_reload(&path, Some(id), files);
        tracing::info!(path = %path.display(), reloaded, "file saved");
        Ok(())
    }

    pub fn save_as(
        &mut self,
        id: ViewId,
        path: &Path,
        files: &dyn FileProvider,
    ) -> Result<(), ViewError> {
        let path = binding_key(path);
        let view = self.views.get_mut(id).ok_or(ViewError::UnknownView)?;
        let old = view.editor_mut().path.replace(path.clone());
        if let View::DualPane { preview, .. } = view {
            preview.set_path(&path);
        }
        if let Some(old) = old {
            self.bindings.unbind(&old, id);
        }
        self.bindings.bind(&path, id);
        self.save(id, files)
    }

    /// Reloads every view bound to `path` except `origin` from disk, with the
    /// cursor clamped to the new content, and re-renders their previews.
    /// Returns the number of reloaded views.
    pub fn broadcast_reload(
        &mut self,
        path: &Path,
        origin: Option<ViewId>,
        files: &dyn FileProvider,
    ) -> usize {
        let path = binding_key(path);
        let targets: Vec<ViewId> = self
            .bindings
            .views_for(&path)
            .iter()
            .copied()
            .filter(|id| Some(*id) != origin)
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let text = match files.read_text(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "reload after save failed");
                return 0;
            }
        };

        let mut reloaded = 0;
        for id in targets {
            if let Some(view) = self.views.get_mut(id) {
                view.editor_mut().buffer_mut().reload(&text);
                view.sync_preview(true);
                reloaded += 1;
            }
        }
        reloaded
    }

    /// Writes every open buffer to `<dir>/<name>.autosave`. Failures are
    /// logged and skipped. Returns the number of files written.
    pub fn autosave_all(&self, dir: &Path, files: &dyn FileProvider) -> usize {
        let mut written = 0;
        for (index, id) in self.order.iter().enumerate() {
            let Some(view) = self.views.get(*id) else {
                continue;
            };
            let target = autosave_path(dir, view.path(), index);
            match files.write_file(&target, &view.editor().buffer().text()) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(path = %target.display(), error = %e, "autosave failed")
                }
            }
        }
        written
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/views.rs"]
mod tests;
