//! 应用数据路径管理
//!
//! - macOS: ~/Library/Application Support/nexus/{logs,session.json}
//! - Linux: ~/.local/share/nexus/{logs,session.json}
//! - Windows: %APPDATA%\nexus\{logs,session.json}

use std::path::{Path, PathBuf};

const APP_NAME: &str = "nexus";
const LOG_DIR: &str = "logs";
const SESSION_FILE: &str = "session.json";

fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        // 优先使用 XDG_DATA_HOME，否则使用 ~/.local/share
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(LOG_DIR))
}

pub fn get_session_path() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(SESSION_FILE))
}

fn ensure_dir(dir: Option<PathBuf>, what: &str) -> std::io::Result<PathBuf> {
    let dir = dir.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Cannot determine {} directory", what),
        )
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    ensure_dir(get_log_dir(), "log")
}

/// `<dir>/<file name>.autosave`; buffers without a path use `untitled-<n>`.
pub fn autosave_path(dir: &Path, file: Option<&Path>, index: usize) -> PathBuf {
    let name = file
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("untitled-{}", index));
    dir.join(format!("{}.autosave", name))
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/backup.rs"]
mod tests;
