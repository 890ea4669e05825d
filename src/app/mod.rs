//! 应用层：工作台

pub mod workbench;

pub use workbench::{ReplaceModeOutcome, SearchPhase, Workbench};
