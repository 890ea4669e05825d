//! 搜索服务模块
//!
//! - CompiledPattern: 搜索选项 → 可执行的逐行匹配器
//! - FileWalker: 项目文件遍历 + include/exclude 过滤
//! - GlobalSearchService: 后台全局搜索，流式返回结果

mod global;
mod pattern;
mod walker;

pub use global::{GlobalSearchService, GlobalSearchTask};
pub use pattern::CompiledPattern;
pub use walker::{FileFilter, FileWalker};
