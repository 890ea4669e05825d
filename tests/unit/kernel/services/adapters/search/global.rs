use super::*;
use crate::kernel::services::ports::search::SearchOptions;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use tempfile::tempdir;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

struct Collected {
    files: Vec<FileMatches>,
    progress: usize,
    total_files: usize,
    total_matches: usize,
    cancelled: bool,
}

fn collect(rx: &Receiver<GlobalSearchMessage>) -> Collected {
    let mut out = Collected {
        files: Vec::new(),
        progress: 0,
        total_files: 0,
        total_matches: 0,
        cancelled: false,
    };
    loop {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(GlobalSearchMessage::FileMatches { file_matches, .. }) => {
                out.files.push(file_matches)
            }
            Ok(GlobalSearchMessage::Progress { .. }) => out.progress += 1,
            Ok(GlobalSearchMessage::Complete {
                total_files,
                total_matches,
                cancelled,
                ..
            }) => {
                out.total_files = total_files;
                out.total_matches = total_matches;
                out.cancelled = cancelled;
                return out;
            }
            Err(_) => panic!("Timeout"),
        }
    }
}

fn run_search(root: &Path, pattern: &str, options: SearchOptions) -> Collected {
    let rt = create_runtime();
    let service = GlobalSearchService::new(rt.handle().clone());
    let (tx, rx) = mpsc::sync_channel(64);
    let matcher = CompiledPattern::compile(pattern, &options).unwrap();
    let _task = service.search_in_dir(FileWalker::new(root, &options), matcher, tx);
    collect(&rx)
}

fn file_names(collected: &Collected) -> Vec<String> {
    collected
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_global_search_literal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("test1.txt"), "hello world").unwrap();
    fs::write(dir.path().join("test2.txt"), "hello rust").unwrap();
    fs::write(dir.path().join("other.txt"), "goodbye world").unwrap();

    let result = run_search(dir.path(), "hello", SearchOptions::default());

    assert_eq!(file_names(&result), vec!["test1.txt", "test2.txt"]);
    assert_eq!(result.total_matches, 2);
    assert_eq!(result.total_files, 3);
    assert!(!result.cancelled);
}

#[test]
fn test_global_search_regex() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("test1.txt"), "hello123 world").unwrap();
    fs::write(dir.path().join("test2.txt"), "hello456 rust").unwrap();

    let result = run_search(dir.path(), r"hello\d+", SearchOptions::default().regex(true));

    let total: usize = result.files.iter().map(|f| f.matches.len()).sum();
    assert_eq!(total, 2);
    assert_eq!(result.total_matches, 2);
    assert_eq!(result.files[0].matches[0].length, 8);
}

#[test]
fn test_one_match_per_line() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "foo foo foo\nbar\nfoo\n").unwrap();

    let result = run_search(dir.path(), "foo", SearchOptions::default());

    let matches = &result.files[0].matches;
    assert_eq!(matches.len(), 2);
    assert_eq!((matches[0].line, matches[0].column), (1, 0));
    assert_eq!((matches[1].line, matches[1].column), (3, 0));
}

#[test]
fn test_include_filter_limits_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "needle").unwrap();
    fs::write(dir.path().join("b.txt"), "needle").unwrap();
    fs::write(dir.path().join("README.md"), "needle").unwrap();

    let result = run_search(dir.path(), "needle", SearchOptions::default().include(".py"));

    assert_eq!(file_names(&result), vec!["a.py"]);
}

#[test]
fn test_exclude_multi_dot_extension() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bundle.min.js"), "needle").unwrap();
    fs::write(dir.path().join("app.js"), "needle").unwrap();

    let result = run_search(
        dir.path(),
        "needle",
        SearchOptions::default().exclude(".min.js"),
    );

    assert_eq!(file_names(&result), vec!["app.js"]);
}

#[test]
fn test_crlf_lines_and_snippets() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("win.txt"), "first\r\n  target here   \r\nlast").unwrap();

    let result = run_search(dir.path(), "here", SearchOptions::default());

    let m = &result.files[0].matches[0];
    assert_eq!(m.line, 2);
    assert_eq!(m.column, 9);
    assert_eq!(m.snippet, "  target here");
}

#[test]
fn test_whole_word_option() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "concatenate\nthe cat\n").unwrap();

    let result = run_search(dir.path(), "cat", SearchOptions::default().whole_word(true));

    assert_eq!(result.files[0].matches.len(), 1);
    assert_eq!(result.files[0].matches[0].line, 2);
}

#[test]
fn test_skip_binary_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("text.txt"), "hello world").unwrap();
    fs::write(dir.path().join("binary.bin"), b"hello\x00world").unwrap();

    let result = run_search(dir.path(), "hello", SearchOptions::default());

    assert_eq!(file_names(&result), vec!["text.txt"]);
}

#[test]
fn test_skip_non_utf8_files_entirely() {
    let dir = tempdir().unwrap();
    // 第一行可以解码，第二行不行：整个文件都不应出现在结果里
    fs::write(dir.path().join("latin1.txt"), b"hello\ncaf\xe9 hello\n").unwrap();
    fs::write(dir.path().join("utf8.txt"), "hello").unwrap();

    let result = run_search(dir.path(), "hello", SearchOptions::default());

    assert_eq!(file_names(&result), vec!["utf8.txt"]);
}

#[test]
fn test_complete_sent_with_no_matches() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "nothing here").unwrap();

    let result = run_search(dir.path(), "absent", SearchOptions::default());

    assert!(result.files.is_empty());
    assert_eq!(result.total_matches, 0);
    assert_eq!(result.total_files, 1);
}

#[test]
fn test_progress_messages() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
    }

    let rt = create_runtime();
    let settings = SearchSettings {
        progress_interval: 2,
        ..SearchSettings::default()
    };
    let service = GlobalSearchService::with_settings(rt.handle().clone(), settings);
    let (tx, rx) = mpsc::sync_channel(64);
    let options = SearchOptions::default();
    let matcher = CompiledPattern::compile("x", &options).unwrap();
    let _task = service.search_in_dir(FileWalker::new(dir.path(), &options), matcher, tx);

    let result = collect(&rx);
    assert_eq!(result.progress, 2);
    assert_eq!(result.total_files, 5);
}

#[test]
fn test_messages_carry_the_task_id() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hit").unwrap();

    let rt = create_runtime();
    let service = GlobalSearchService::new(rt.handle().clone());
    let (tx, rx) = mpsc::sync_channel(64);
    let options = SearchOptions::default();
    let first = service.search_in_dir(
        FileWalker::new(dir.path(), &options),
        CompiledPattern::compile("hit", &options).unwrap(),
        tx.clone(),
    );
    let second = service.search_in_dir(
        FileWalker::new(dir.path(), &options),
        CompiledPattern::compile("hit", &options).unwrap(),
        tx,
    );
    assert_ne!(first.id(), second.id());

    let mut completed = Vec::new();
    while completed.len() < 2 {
        let msg = rx.recv_timeout(Duration::from_secs(5)).expect("Timeout");
        assert!(msg.search_id() == first.id() || msg.search_id() == second.id());
        if matches!(msg, GlobalSearchMessage::Complete { .. }) {
            completed.push(msg.search_id());
        }
    }
    completed.sort();
    let mut expected = vec![first.id(), second.id()];
    expected.sort();
    assert_eq!(completed, expected);
}

#[test]
fn test_cancelled_search_still_completes() {
    let dir = tempdir().unwrap();
    let mut paths: Vec<PathBuf> = Vec::new();
    for i in 0..50 {
        let path = dir.path().join(format!("f{i:02}.txt"));
        fs::write(&path, "needle").unwrap();
        paths.push(path);
    }

    let rt = create_runtime();
    let service = GlobalSearchService::new(rt.handle().clone());
    // 容量 1：worker 很快阻塞在发送上，取消一定先于扫描结束生效
    let (tx, rx) = mpsc::sync_channel(1);
    let options = SearchOptions::default();
    let task = service.search_in_dir(
        FileWalker::new(dir.path(), &options),
        CompiledPattern::compile("needle", &options).unwrap(),
        tx,
    );
    task.cancel();
    assert!(task.is_cancelled());

    let result = collect(&rx);
    assert!(result.cancelled);
    assert!(result.files.len() < paths.len());
}

#[test]
fn test_large_file_streams_in_chunks() {
    let dir = tempdir().unwrap();
    let content: String = (0..600).map(|i| format!("line {i} needle\n")).collect();
    fs::write(dir.path().join("big.log"), content).unwrap();

    let result = run_search(dir.path(), "needle", SearchOptions::default());

    let sizes: Vec<usize> = result.files.iter().map(|f| f.matches.len()).collect();
    assert_eq!(sizes, vec![MATCH_CHUNK, MATCH_CHUNK, 600 - 2 * MATCH_CHUNK]);
    let lines: Vec<usize> = result
        .files
        .iter()
        .flat_map(|f| f.matches.iter().map(|m| m.line))
        .collect();
    assert_eq!(lines, (1..=600).collect::<Vec<_>>());
    assert_eq!(result.total_matches, 600);
    assert_eq!(result.total_files, 1);
}
