//! 全局搜索服务
//!
//! - 单个后台 worker（spawn_blocking）按路径顺序遍历并逐行匹配
//! - 结果边扫描边发送，每条消息最多 MATCH_CHUNK 行；最后总会发送一条 Complete
//! - 二进制 / 非 UTF-8 / 无法读取的文件在发送任何结果之前整体跳过

use super::pattern::CompiledPattern;
use super::walker::FileWalker;
use crate::kernel::services::ports::search::{FileMatches, GlobalSearchMessage, LineMatch};
use crate::kernel::services::ports::settings::SearchSettings;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

const PREVIEW_SIZE: usize = 8192;
/// Hits of one file per `FileMatches` message. Large files arrive as
/// several consecutive messages for the same path.
const MATCH_CHUNK: usize = 256;

static GLOBAL_SEARCH_ID: AtomicU64 = AtomicU64::new(0);

fn next_global_search_id() -> u64 {
    GLOBAL_SEARCH_ID.fetch_add(1, Ordering::Relaxed)
}

pub struct GlobalSearchTask {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl GlobalSearchTask {
    pub fn new() -> Self {
        Self {
            id: next_global_search_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

impl Default for GlobalSearchTask {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct SearchTotals {
    files_searched: AtomicUsize,
    files_with_matches: AtomicUsize,
    total_matches: AtomicUsize,
}

pub struct GlobalSearchService {
    runtime: tokio::runtime::Handle,
    settings: SearchSettings,
}

impl GlobalSearchService {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self::with_settings(runtime, SearchSettings::default())
    }

    pub fn with_settings(runtime: tokio::runtime::Handle, settings: SearchSettings) -> Self {
        Self { runtime, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SearchSettings) {
        self.settings = settings;
    }

    /// Starts one background scan. The pattern is compiled by the caller so
    /// an invalid regex never reaches this point.
    pub fn search_in_dir(
        &self,
        walker: FileWalker,
        matcher: CompiledPattern,
        tx: SyncSender<GlobalSearchMessage>,
    ) -> GlobalSearchTask {
        let task = GlobalSearchTask::new();
        let search_id = task.id();
        let cancelled = task.cancelled_flag();
        let walker = walker.with_settings(&self.settings);
        let progress_interval = self.settings.progress_interval.max(1);

        tracing::info!(
            search_id,
            root = %walker.root().display(),
            pattern = matcher.as_str(),
            "global search started"
        );

        self.runtime.spawn(async move {
            let totals = Arc::new(SearchTotals::default());

            let totals_for_blocking = totals.clone();
            let cancelled_for_blocking = cancelled.clone();
            let tx_for_blocking = tx.clone();
            let result = tokio::task::spawn_blocking(move || {
                search_dir(
                    &walker,
                    &matcher,
                    search_id,
                    progress_interval,
                    &cancelled_for_blocking,
                    &totals_for_blocking,
                    &tx_for_blocking,
                )
            })
            .await;

            if let Err(e) = result {
                tracing::warn!(search_id, error = %e, "global search worker failed");
            }

            let total_files = totals.files_searched.load(Ordering::Relaxed);
            let total_matches = totals.total_matches.load(Ordering::Relaxed);
            let cancelled = cancelled.load(Ordering::Relaxed);
            tracing::info!(
                search_id,
                total_files,
                total_matches,
                cancelled,
                "global search finished"
            );
            let _ = tx.send(GlobalSearchMessage::Complete {
                search_id,
                total_files,
                total_matches,
                cancelled,
            });
        });

        task
    }
}

fn is_likely_binary(content: &[u8]) -> bool {
    memchr::memchr(0, &content[..content.len().min(PREVIEW_SIZE)]).is_some()
}

fn search_dir(
    walker: &FileWalker,
    matcher: &CompiledPattern,
    search_id: u64,
    progress_interval: usize,
    cancelled: &AtomicBool,
    totals: &SearchTotals,
    tx: &SyncSender<GlobalSearchMessage>,
) {
    for path in walker.files() {
        if cancelled.load(Ordering::Relaxed) {
            return;
        }

        let text = match read_text_file(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping file");
                continue;
            }
        };

        let mut receiver_gone = false;
        let found = scan_lines(&text, matcher, |matches| {
            totals
                .total_matches
                .fetch_add(matches.len(), Ordering::Relaxed);
            let sent = tx.send(GlobalSearchMessage::FileMatches {
                search_id,
                file_matches: FileMatches {
                    path: path.clone(),
                    matches,
                },
            });
            receiver_gone = sent.is_err();
            !receiver_gone && !cancelled.load(Ordering::Relaxed)
        });
        if receiver_gone {
            // 接收端已经关闭
            return;
        }

        let searched = totals.files_searched.fetch_add(1, Ordering::Relaxed) + 1;
        if found > 0 {
            totals.files_with_matches.fetch_add(1, Ordering::Relaxed);
        }

        if searched % progress_interval == 0 {
            let _ = tx.send(GlobalSearchMessage::Progress {
                search_id,
                files_searched: searched,
                files_with_matches: totals.files_with_matches.load(Ordering::Relaxed),
            });
        }
    }
}

/// Reads one file as text. Binary and non-UTF-8 files are rejected whole,
/// before any of their lines is scanned.
fn read_text_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    if is_likely_binary(&bytes) {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "binary file"));
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Scans `text` line by line, keeping only the first hit of each line, and
/// hands the hits to `emit` as soon as `MATCH_CHUNK` of them are collected.
/// Stops when `emit` returns false. Returns the number of hits found.
fn scan_lines(
    text: &str,
    matcher: &CompiledPattern,
    mut emit: impl FnMut(Vec<LineMatch>) -> bool,
) -> usize {
    let bytes = text.as_bytes();
    let mut chunk = Vec::new();
    let mut found = 0usize;
    let mut line_no = 0usize;
    let mut start = 0usize;

    while start < bytes.len() {
        let end = memchr::memchr(b'\n', &bytes[start..]).map_or(bytes.len(), |i| start + i);
        line_no += 1;

        let raw = &text[start..end];
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(hit) = matcher.search(line) {
            chunk.push(LineMatch::new(line_no, hit, line.trim_end()));
            found += 1;
            if chunk.len() == MATCH_CHUNK && !emit(std::mem::take(&mut chunk)) {
                return found;
            }
        }
        start = end + 1;
    }

    if !chunk.is_empty() {
        emit(chunk);
    }
    found
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/global.rs"]
mod tests;
