//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod backup;
pub mod file;
pub mod search;
pub mod session;
pub mod settings;

pub use backup::{autosave_path, ensure_log_dir, get_log_dir, get_session_path};
pub use file::LocalFileProvider;
pub use search::{CompiledPattern, FileFilter, FileWalker, GlobalSearchService, GlobalSearchTask};
pub use session::{load_session, save_session};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
