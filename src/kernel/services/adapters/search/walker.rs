//! 项目文件遍历
//!
//! - 按路径字典序递归遍历，结果可复现
//! - 默认不跳过隐藏文件、不读 .gitignore（与普通目录遍历一致），可通过设置打开
//! - include / exclude 过滤：先 include，再 exclude，exclude 优先

use crate::kernel::services::ports::search::SearchOptions;
use crate::kernel::services::ports::settings::SearchSettings;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FileFilter {
    pub fn new(options: &SearchOptions) -> Self {
        Self {
            include: options.include_filters.clone(),
            exclude: options.exclude_filters.clone(),
        }
    }

    pub fn accepts(&self, file_name: &str) -> bool {
        if !self.include.is_empty()
            && !self.include.iter().any(|f| filter_matches(f, file_name))
        {
            return false;
        }
        !self.exclude.iter().any(|f| filter_matches(f, file_name))
    }
}

/// `.ext` matches by suffix (so `.min.js` catches `bundle.min.js`),
/// anything else must equal the file name.
fn filter_matches(filter: &str, file_name: &str) -> bool {
    if filter.starts_with('.') {
        file_name.ends_with(filter)
    } else {
        file_name == filter
    }
}

#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    filter: FileFilter,
    respect_gitignore: bool,
    skip_hidden: bool,
    max_file_size: Option<u64>,
}

impl FileWalker {
    pub fn new(root: impl Into<PathBuf>, options: &SearchOptions) -> Self {
        Self {
            root: root.into(),
            filter: FileFilter::new(options),
            respect_gitignore: false,
            skip_hidden: false,
            max_file_size: None,
        }
    }

    pub fn with_settings(mut self, settings: &SearchSettings) -> Self {
        self.respect_gitignore = settings.respect_gitignore;
        self.skip_hidden = settings.skip_hidden;
        self.max_file_size = settings.max_file_size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Regular files under the root that pass the filters, in path order.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .hidden(self.skip_hidden)
            .max_filesize(self.max_file_size)
            .sort_by_file_path(|a, b| a.cmp(b));
        if self.respect_gitignore {
            builder
                .parents(true)
                .ignore(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .require_git(false);
        }

        let filter = self.filter.clone();
        builder
            .build()
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| filter.accepts(name))
            })
            .map(|entry| entry.into_path())
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/walker.rs"]
mod tests;
