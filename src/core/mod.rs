//! 核心模块
//!
//! - Context: 应用上下文（项目目录、设置）

pub mod context;

pub use context::AppContext;
