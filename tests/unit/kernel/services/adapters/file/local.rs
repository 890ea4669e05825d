use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_read_write_file() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.txt");

    let provider = LocalFileProvider::new();
    assert_eq!(provider.scheme(), "file");

    provider.write_file(&file_path, "Hello, World!").unwrap();
    assert!(provider.exists(&file_path));
    assert!(provider.is_file(&file_path));

    let content = provider.read_text(&file_path).unwrap();
    assert_eq!(content, "Hello, World!");
}

#[test]
fn test_write_creates_parent_dirs_and_truncates() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("a/b/c.txt");

    let provider = LocalFileProvider::new();
    provider.write_file(&file_path, "a much longer first version").unwrap();
    provider.write_file(&file_path, "short").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "short");
}

#[test]
fn test_read_missing_file() {
    let dir = tempdir().unwrap();
    let provider = LocalFileProvider::new();

    let err = provider.read_file_bytes(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, FileError::NotFound(_)));
}

#[test]
fn test_directories_are_not_files() {
    let dir = tempdir().unwrap();
    let provider = LocalFileProvider::new();

    assert!(matches!(
        provider.read_file_bytes(dir.path()),
        Err(FileError::NotAFile(_))
    ));
    assert!(matches!(
        provider.write_file(dir.path(), "x"),
        Err(FileError::NotAFile(_))
    ));
    assert!(!provider.is_file(dir.path()));
}

#[test]
fn test_empty_path_is_invalid() {
    let provider = LocalFileProvider::new();
    assert!(matches!(
        provider.write_file(Path::new(""), "x"),
        Err(FileError::InvalidPath(_))
    ));
}

#[test]
fn test_read_text_falls_back_to_latin1() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("latin1.txt");
    fs::write(&file_path, b"caf\xe9").unwrap();

    let provider = LocalFileProvider::new();
    assert_eq!(provider.read_text(&file_path).unwrap(), "café");
}
