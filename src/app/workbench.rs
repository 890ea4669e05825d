//! 工作台：搜索 / 替换状态机和视图的统一入口
//!
//! 职责：
//! - 启动全局搜索并收集结果（按 search_id 过滤过期消息）
//! - 替换模式的开启、单步替换、自动结束
//! - 打开 / 保存 / 关闭视图，项目切换，会话恢复

use crate::core::AppContext;
use crate::kernel::quick_open::{QuickOpen, QuickOpenEntry};
use crate::kernel::replace::{ReplaceError, ReplaceSession, ReplaceStep};
use crate::kernel::search::{MatchHandle, MatchStore, ResultItem};
use crate::kernel::services::adapters::search::{
    CompiledPattern, FileWalker, GlobalSearchService, GlobalSearchTask,
};
use crate::kernel::services::adapters::{load_session, save_session, LocalFileProvider};
use crate::kernel::services::ports::file::{FileError, FileProvider};
use crate::kernel::services::ports::search::{GlobalSearchMessage, SearchError, SearchOptions};
use crate::kernel::services::ports::settings::Session;
use crate::kernel::views::{ViewCoordinator, ViewError, ViewId};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::time::{Duration, Instant};

const GLOBAL_SEARCH_CHANNEL_CAP: usize = 256;
const MAX_GLOBAL_SEARCH_DRAIN_PER_POLL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    ResultsReady,
    ReplaceArmed,
    Replacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceModeOutcome {
    Armed { entries: usize },
    /// No results, or none of them still matches. Phase is `Idle`.
    NothingToReplace,
    Disarmed,
    /// A search is still running.
    Busy,
    Unchanged,
}

pub struct Workbench {
    ctx: AppContext,
    files: Box<dyn FileProvider>,
    search_service: GlobalSearchService,
    search_task: Option<GlobalSearchTask>,
    // One channel for every search; stale generations are dropped by id.
    search_tx: SyncSender<GlobalSearchMessage>,
    search_rx: Receiver<GlobalSearchMessage>,
    store: MatchStore,
    replace: Option<ReplaceSession>,
    views: ViewCoordinator,
    phase: SearchPhase,
    quick_open: QuickOpen,
}

impl Workbench {
    pub fn new(ctx: AppContext, runtime: tokio::runtime::Handle) -> Self {
        Self::with_file_provider(ctx, runtime, Box::new(LocalFileProvider::new()))
    }

    pub fn with_file_provider(
        ctx: AppContext,
        runtime: tokio::runtime::Handle,
        files: Box<dyn FileProvider>,
    ) -> Self {
        let search_service = GlobalSearchService::with_settings(runtime, ctx.settings().search.clone());
        let (search_tx, search_rx) = mpsc::sync_channel(GLOBAL_SEARCH_CHANNEL_CAP);
        let mut quick_open = QuickOpen::new();
        if let Some(root) = ctx.project_dir() {
            quick_open.refresh(root);
        }

        Self {
            ctx,
            files,
            search_service,
            search_task: None,
            search_tx,
            search_rx,
            store: MatchStore::new(),
            replace: None,
            views: ViewCoordinator::new(),
            phase: SearchPhase::Idle,
            quick_open,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    pub fn views(&self) -> &ViewCoordinator {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewCoordinator {
        &mut self.views
    }

    pub fn replace_session(&self) -> Option<&ReplaceSession> {
        self.replace.as_ref()
    }

    pub fn file_provider(&self) -> &dyn FileProvider {
        self.files.as_ref()
    }

    // ---- project ----

    /// Switches the project folder: running search cancelled, results and
    /// replace session dropped, all views closed.
    pub fn open_folder(&mut self, dir: &Path) -> io::Result<()> {
        let root = self.ctx.set_project_dir(dir)?.to_path_buf();
        if let Some(task) = self.search_task.take() {
            task.cancel();
        }
        self.replace = None;
        self.store.clear();
        self.views.close_all();
        self.phase = SearchPhase::Idle;
        self.quick_open.refresh(&root);
        Ok(())
    }

    pub fn quick_open(&self, query: &str) -> Vec<QuickOpenEntry> {
        self.quick_open
            .filter(query, self.ctx.settings().quick_open_limit)
    }

    pub fn refresh_quick_open(&mut self) {
        if let Some(root) = self.ctx.project_dir() {
            self.quick_open.refresh(root);
        }
    }

    // ---- search ----

    /// Starts a project search. Returns `None` (and changes nothing) for a
    /// blank pattern. An invalid regex is reported before any scan starts.
    pub fn start_search(
        &mut self,
        pattern: &str,
        options: SearchOptions,
    ) -> Result<Option<u64>, SearchError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(None);
        }
        let root = self
            .ctx
            .project_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no project folder is open"))?;
        let matcher = CompiledPattern::compile(pattern, &options)?;

        let settings = self.ctx.settings().search.clone();
        if settings.cancel_superseded {
            if let Some(task) = self.search_task.take() {
                task.cancel();
            }
        }
        self.disarm();
        self.search_service.set_settings(settings);

        let walker = FileWalker::new(&root, &options);
        let task = self
            .search_service
            .search_in_dir(walker, matcher.clone(), self.search_tx.clone());
        let search_id = task.id();

        self.store.begin(&root, pattern, options, matcher);
        self.store.set_active_search_id(search_id);
        self.search_task = Some(task);
        self.phase = SearchPhase::Searching;
        Ok(Some(search_id))
    }

    /// Drains pending search messages. Returns true if the store changed.
    pub fn poll_search(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_GLOBAL_SEARCH_DRAIN_PER_POLL {
            match self.search_rx.try_recv() {
                Ok(msg) => changed |= self.apply_search_message(msg),
                Err(_) => break,
            }
        }
        changed
    }

    /// Blocks until the active search completes or `timeout` passes.
    /// Returns true if it completed.
    pub fn wait_for_search(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.phase == SearchPhase::Searching {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            match self.search_rx.recv_timeout(left) {
                Ok(msg) => {
                    self.apply_search_message(msg);
                }
                Err(_) => break,
            }
        }
        self.poll_search();
        self.phase != SearchPhase::Searching
    }

    /// Asks the running scan to stop. Its `Complete` still arrives.
    pub fn cancel_search(&mut self) -> bool {
        match self.search_task.as_ref() {
            Some(task) if self.phase == SearchPhase::Searching => {
                task.cancel();
                true
            }
            _ => false,
        }
    }

    fn apply_search_message(&mut self, msg: GlobalSearchMessage) -> bool {
        let completes = matches!(msg, GlobalSearchMessage::Complete { .. });
        let changed = self.store.apply_message(msg);
        if completes && changed && self.phase == SearchPhase::Searching {
            self.search_task = None;
            self.phase = SearchPhase::ResultsReady;
            tracing::info!(
                files = self.store.file_count(),
                matches = self.store.total_matches(),
                "search results ready"
            );
        }
        changed
    }

    pub fn result_items(&self) -> Vec<ResultItem> {
        self.store.items()
    }

    /// Opens the file of a result with the cursor at the start of its line.
    pub fn open_result(&mut self, handle: MatchHandle) -> Result<ViewId, FileError> {
        let record = self
            .store
            .record(handle)
            .ok_or_else(|| FileError::InvalidPath(format!("no result {:?}", handle)))?;
        let id = self.views.open(&record.path, self.files.as_ref())?;
        self.views.edit(id, |buffer| {
            if let Some(offset) = buffer.line_to_char(record.line.saturating_sub(1)) {
                buffer.set_cursor(offset);
            }
        });
        Ok(id)
    }

    // ---- replace ----

    pub fn set_replace_mode(&mut self, enabled: bool) -> ReplaceModeOutcome {
        if !enabled {
            return if self.disarm() {
                ReplaceModeOutcome::Disarmed
            } else {
                ReplaceModeOutcome::Unchanged
            };
        }

        match self.phase {
            SearchPhase::Searching => return ReplaceModeOutcome::Busy,
            SearchPhase::ReplaceArmed | SearchPhase::Replacing => {
                return ReplaceModeOutcome::Unchanged
            }
            SearchPhase::Idle | SearchPhase::ResultsReady => {}
        }

        let matcher = match self.store.matcher() {
            Some(matcher) if self.store.is_complete() && !self.store.is_empty() => matcher.clone(),
            _ => {
                self.phase = SearchPhase::Idle;
                return ReplaceModeOutcome::NothingToReplace;
            }
        };

        let snapshot = self.store.arm_snapshot(self.files.as_ref());
        if snapshot.is_empty() {
            tracing::info!("replace mode not armed: no match survived re-resolution");
            self.phase = SearchPhase::Idle;
            return ReplaceModeOutcome::NothingToReplace;
        }

        let entries = snapshot.len();
        self.replace = Some(ReplaceSession::new(matcher, snapshot));
        self.phase = SearchPhase::ReplaceArmed;
        tracing::info!(entries, "replace mode armed");
        ReplaceModeOutcome::Armed { entries }
    }

    /// Ends the replace session, if any, and closes its follow view.
    fn disarm(&mut self) -> bool {
        let Some(session) = self.replace.take() else {
            return false;
        };
        if let Some(view) = session.follow_view() {
            self.views.close(view);
        }
        self.phase = SearchPhase::Idle;
        tracing::info!(replaced = session.replaced(), "replace mode disarmed");
        true
    }

    /// Replaces the next match. After the last one the session ends and the
    /// phase returns to `Idle`; the follow view stays open.
    pub fn replace_next(&mut self, replacement: &str) -> Result<ReplaceStep, ReplaceError> {
        let Some(session) = self.replace.as_mut() else {
            return Err(ReplaceError::NotArmed);
        };

        self.phase = SearchPhase::Replacing;
        let result = session.step(replacement, &mut self.views, self.files.as_ref());

        match &result {
            Ok(ReplaceStep::Completed { .. }) | Ok(ReplaceStep::Idle) => {
                self.replace = None;
                self.phase = SearchPhase::Idle;
            }
            Ok(ReplaceStep::Replaced(_)) | Err(_) => self.phase = SearchPhase::ReplaceArmed,
        }
        result
    }

    // ---- views ----

    pub fn open_file(&mut self, path: &Path) -> Result<ViewId, FileError> {
        self.views.open(path, self.files.as_ref())
    }

    pub fn new_untitled(&mut self) -> ViewId {
        self.views.open_untitled()
    }

    pub fn save_view(&mut self, id: ViewId) -> Result<(), ViewError> {
        self.views.save(id, self.files.as_ref())
    }

    pub fn save_view_as(&mut self, id: ViewId, path: &Path) -> Result<(), ViewError> {
        self.views.save_as(id, path, self.files.as_ref())
    }

    pub fn split_view(&mut self, id: ViewId) -> Option<ViewId> {
        self.views.split(id)
    }

    pub fn close_view(&mut self, id: ViewId) -> bool {
        self.views.close(id)
    }

    /// Writes every open buffer to `dir` as `<name>.autosave`.
    pub fn autosave(&self, dir: &Path) -> usize {
        self.views.autosave_all(dir, self.files.as_ref())
    }

    // ---- session ----

    pub fn session(&self) -> Session {
        Session {
            project_dir: self.ctx.project_dir().map(Path::to_path_buf),
            open_tabs: self.views.open_paths(),
        }
    }

    pub fn save_session_to(&self, path: &Path) -> io::Result<()> {
        save_session(path, &self.session())
    }

    /// Reopens the project folder and tabs of a saved session. Missing
    /// folders and files are skipped. Returns the number of reopened tabs.
    pub fn restore_session(&mut self, session: &Session) -> usize {
        if let Some(dir) = session.project_dir.as_deref() {
            if let Err(e) = self.open_folder(dir) {
                tracing::warn!(project_dir = %dir.display(), error = %e, "session folder skipped");
            }
        }
        self.reopen_tabs(&session.open_tabs)
    }

    /// Opens `root`; if the session stored at `session_path` belongs to the
    /// same folder, its tabs are reopened too. Returns the number of tabs.
    pub fn open_folder_with_session(
        &mut self,
        root: &Path,
        session_path: &Path,
    ) -> io::Result<usize> {
        self.open_folder(root)?;
        let Some(session) = load_session(session_path) else {
            return Ok(0);
        };
        if session.project_dir.as_deref() != self.ctx.project_dir() {
            return Ok(0);
        }
        let opened = self.reopen_tabs(&session.open_tabs);
        tracing::info!(opened, "session restored");
        Ok(opened)
    }

    fn reopen_tabs(&mut self, tabs: &[PathBuf]) -> usize {
        let mut opened = 0;
        for path in tabs {
            if !self.files.is_file(path) {
                tracing::debug!(path = %path.display(), "session tab skipped");
                continue;
            }
            match self.open_file(path) {
                Ok(_) => opened += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "session tab failed"),
            }
        }
        opened
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workbench.rs"]
mod tests;
