//! Headless editor core: search results, replace sessions and open views.

pub mod preview;
pub mod quick_open;
pub mod replace;
pub mod search;
pub mod services;
pub mod views;

pub use preview::{Preview, PreviewKind};
pub use quick_open::{QuickOpen, QuickOpenEntry, QUICK_OPEN_LIMIT};
pub use replace::{ReplaceError, ReplaceSession, ReplaceStep};
pub use search::{MatchHandle, MatchStore, ResultItem, SearchFileResult};
pub use views::{EditorView, View, ViewBindings, ViewCoordinator, ViewError, ViewId};
