//! Service ports: traits + data contracts.

pub mod file;
pub mod search;
pub mod settings;

pub use file::{decode_text, FileError, FileProvider, Result as FileResult};
pub use search::{
    FileMatches, GlobalSearchMessage, LineHit, LineMatch, MatchRecord, SearchError,
    SearchOptions,
};
pub use settings::{SearchSettings, Session, Settings};
