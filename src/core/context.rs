//! 应用上下文
//!
//! 当前项目目录和设置，只能通过 setter 修改

use crate::kernel::services::ports::settings::Settings;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    project_dir: Option<PathBuf>,
    settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            project_dir: None,
            settings,
        }
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    /// Switches the project folder. The path must be an existing directory;
    /// it is stored canonicalized.
    pub fn set_project_dir(&mut self, dir: &Path) -> io::Result<&Path> {
        let dir = dir.canonicalize()?;
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir.display()),
            ));
        }
        tracing::info!(project_dir = %dir.display(), "project folder changed");
        Ok(self.project_dir.insert(dir))
    }

    pub fn clear_project_dir(&mut self) {
        self.project_dir = None;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/context.rs"]
mod tests;
