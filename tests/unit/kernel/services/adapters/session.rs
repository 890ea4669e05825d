use super::*;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_save_and_load_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state/session.json");
    let session = Session {
        project_dir: Some(PathBuf::from("/work/project")),
        open_tabs: vec![
            PathBuf::from("/work/project/a.rs"),
            PathBuf::from("/work/project/README.md"),
        ],
    };

    save_session(&path, &session).unwrap();
    assert_eq!(load_session(&path), Some(session));
}

#[test]
fn test_load_session_tolerates_missing_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{}").unwrap();

    assert_eq!(load_session(&path), Some(Session::default()));
}

#[test]
fn test_load_session_rejects_garbage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "[1, 2").unwrap();

    assert_eq!(load_session(&path), None);
    assert_eq!(load_session(&dir.path().join("missing.json")), None);
}
