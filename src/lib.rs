//! nexus - 项目级搜索 / 替换引擎与视图同步核心
//!
//! 模块结构：
//! - core: 应用上下文（项目目录、设置）
//! - kernel: 搜索结果、替换会话、视图协调、预览，以及 services（ports + adapters）
//! - models: 数据模型（TextBuffer）
//! - app: 应用层（Workbench 状态机）

pub mod app;
pub mod core;
pub mod kernel;
pub mod models;
