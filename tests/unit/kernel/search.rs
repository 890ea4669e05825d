use super::*;
use crate::kernel::services::adapters::LocalFileProvider;
use crate::kernel::services::ports::search::LineHit;
use std::fs;
use tempfile::tempdir;

fn line_match(line: usize, column: usize, length: usize, snippet: &str) -> LineMatch {
    LineMatch::new(line, LineHit { column, length }, snippet)
}

fn file_msg(search_id: u64, path: &Path, matches: Vec<LineMatch>) -> GlobalSearchMessage {
    GlobalSearchMessage::FileMatches {
        search_id,
        file_matches: FileMatches {
            path: path.to_path_buf(),
            matches,
        },
    }
}

fn complete(search_id: u64, total_files: usize, total_matches: usize) -> GlobalSearchMessage {
    GlobalSearchMessage::Complete {
        search_id,
        total_files,
        total_matches,
        cancelled: false,
    }
}

fn started_store(root: &Path, query: &str, search_id: u64) -> MatchStore {
    let options = SearchOptions::default();
    let matcher = CompiledPattern::compile(query, &options).unwrap();
    let mut store = MatchStore::new();
    store.begin(root, query, options, matcher);
    assert!(store.set_active_search_id(search_id));
    store
}

#[test]
fn test_begin_resets_results() {
    let root = Path::new("/project");
    let mut store = started_store(root, "foo", 1);
    store.apply_message(file_msg(1, &root.join("a.txt"), vec![line_match(1, 0, 3, "foo")]));
    store.apply_message(complete(1, 1, 1));
    assert!(store.is_complete());

    let matcher = CompiledPattern::compile("bar", &SearchOptions::default()).unwrap();
    store.begin(root, "bar", SearchOptions::default(), matcher);
    assert!(store.is_empty());
    assert!(store.is_searching());
    assert!(!store.is_complete());
    assert_eq!(store.active_search_id(), None);
    assert_eq!(store.query(), "bar");
}

#[test]
fn test_messages_of_other_searches_are_ignored() {
    let root = Path::new("/project");
    let mut store = started_store(root, "foo", 7);

    assert!(!store.apply_message(file_msg(6, &root.join("old.txt"), vec![line_match(1, 0, 3, "foo")])));
    assert!(!store.apply_message(complete(6, 10, 1)));
    assert!(store.is_empty());
    assert!(store.is_searching());

    assert!(store.apply_message(file_msg(7, &root.join("new.txt"), vec![line_match(2, 4, 3, "    foo")])));
    assert_eq!(store.total_matches(), 1);
}

#[test]
fn test_complete_without_matches() {
    let mut store = started_store(Path::new("/project"), "foo", 3);
    assert!(store.apply_message(GlobalSearchMessage::Progress {
        search_id: 3,
        files_searched: 100,
        files_with_matches: 0,
    }));
    assert!(store.apply_message(complete(3, 120, 0)));

    assert!(store.is_complete());
    assert!(!store.is_searching());
    assert!(store.is_empty());
    assert_eq!(store.files_searched(), 120);
    assert!(!store.was_cancelled());
}

#[test]
fn test_items_and_records_keep_result_order() {
    let root = Path::new("/project");
    let mut store = started_store(root, "foo", 1);
    store.apply_message(file_msg(
        1,
        &root.join("src/a.rs"),
        vec![line_match(3, 1, 3, " foo"), line_match(9, 0, 3, "foo()")],
    ));
    store.apply_message(file_msg(1, &root.join("b.rs"), vec![line_match(1, 2, 3, "  foo")]));

    let items = store.items();
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].display_path,
        Path::new("src").join("a.rs").to_string_lossy()
    );
    assert_eq!((items[1].line, items[1].snippet.as_str()), (9, "foo()"));
    assert_eq!(items[2].display_path, "b.rs");
    assert_eq!(
        items[2].handle,
        MatchHandle {
            file_index: 1,
            match_index: 0
        }
    );

    let records = store.records();
    assert_eq!(records[0], MatchRecord::new(root.join("src/a.rs"), 3, 1, 3));
    assert_eq!(records[2], MatchRecord::new(root.join("b.rs"), 1, 2, 3));
    assert_eq!(store.record(items[1].handle), Some(records[1].clone()));
    assert_eq!(
        store.record(MatchHandle {
            file_index: 5,
            match_index: 0
        }),
        None
    );
}

#[test]
fn test_arm_snapshot_reresolves_against_current_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let same = root.join("same.txt");
    let moved = root.join("moved.txt");
    let gone_line = root.join("short.txt");
    let gone_match = root.join("edited.txt");
    let missing = root.join("missing.txt");

    fs::write(&same, "xx foo\n").unwrap();
    fs::write(&moved, "line\n  ab foo\n").unwrap();
    fs::write(&gone_line, "foo\n").unwrap();
    fs::write(&gone_match, "bar\n").unwrap();

    let mut store = started_store(root, "foo", 1);
    store.apply_message(file_msg(1, &same, vec![line_match(1, 3, 3, "xx foo")]));
    store.apply_message(file_msg(1, &moved, vec![line_match(2, 2, 3, "  foo")]));
    store.apply_message(file_msg(1, &gone_line, vec![line_match(4, 0, 3, "foo")]));
    store.apply_message(file_msg(1, &gone_match, vec![line_match(1, 0, 3, "foo")]));
    store.apply_message(file_msg(1, &missing, vec![line_match(1, 0, 3, "foo")]));
    store.apply_message(complete(1, 5, 5));

    let snapshot = store.arm_snapshot(&LocalFileProvider::new());

    assert_eq!(
        snapshot,
        vec![
            MatchRecord::new(&same, 1, 3, 3),
            MatchRecord::new(&moved, 2, 5, 3),
        ]
    );
}

#[test]
fn test_arm_snapshot_without_matcher_is_empty() {
    let store = MatchStore::new();
    assert!(store.arm_snapshot(&LocalFileProvider::new()).is_empty());
}

#[test]
fn test_clear() {
    let root = Path::new("/project");
    let mut store = started_store(root, "foo", 1);
    store.apply_message(file_msg(1, &root.join("a"), vec![line_match(1, 0, 3, "foo")]));
    store.clear();

    assert!(store.is_empty());
    assert!(store.matcher().is_none());
    assert_eq!(store.total_matches(), 0);
    assert!(!store.apply_message(complete(1, 1, 1)));
}

#[test]
fn test_consecutive_messages_for_one_file_are_merged() {
    let root = Path::new("/project");
    let big = root.join("big.log");
    let mut store = started_store(root, "foo", 1);
    store.apply_message(file_msg(1, &big, vec![line_match(1, 0, 3, "foo")]));
    store.apply_message(file_msg(1, &big, vec![line_match(7, 2, 3, "  foo")]));
    store.apply_message(file_msg(1, &root.join("next.txt"), vec![line_match(1, 0, 3, "foo")]));

    assert_eq!(store.file_count(), 2);
    assert_eq!(store.total_matches(), 3);
    let lines: Vec<usize> = store.files()[0].matches.iter().map(|m| m.line).collect();
    assert_eq!(lines, vec![1, 7]);
    assert_eq!(store.items()[1].display_path, "big.log");
}
