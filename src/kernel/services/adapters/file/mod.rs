//! 文件服务模块
//!
//! FileProvider 的本地实现

pub mod local;

pub use local::LocalFileProvider;
