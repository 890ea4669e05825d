//! 会话持久化：项目目录 + 打开的标签页

use crate::kernel::services::ports::settings::Session;
use std::io;
use std::path::Path;

pub fn load_session(path: &Path) -> Option<Session> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid session file");
            None
        }
    }
}

pub fn save_session(path: &Path, session: &Session) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(session)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/session.rs"]
mod tests;
