use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    Io(io::Error),
    InvalidPattern(regex::Error),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Io(e) => write!(f, "IO error: {}", e),
            SearchError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<io::Error> for SearchError {
    fn from(e: io::Error) -> Self {
        SearchError::Io(e)
    }
}

impl From<regex::Error> for SearchError {
    fn from(e: regex::Error) -> Self {
        SearchError::InvalidPattern(e)
    }
}

/// User-facing search options.
///
/// Filters are either extension form (`.py`, `.min.js`) or an exact file
/// name (`Makefile`). Include filters are OR-ed, exclude filters are OR-ed,
/// and exclude wins when both apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub use_regex: bool,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub include_filters: Vec<String>,
    pub exclude_filters: Vec<String>,
}

impl SearchOptions {
    /// Splits a comma separated filter field, dropping blank entries.
    pub fn parse_filters(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn regex(mut self, on: bool) -> Self {
        self.use_regex = on;
        self
    }

    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    pub fn whole_word(mut self, on: bool) -> Self {
        self.whole_word = on;
        self
    }

    pub fn include(mut self, filters: &str) -> Self {
        self.include_filters = Self::parse_filters(filters);
        self
    }

    pub fn exclude(mut self, filters: &str) -> Self {
        self.exclude_filters = Self::parse_filters(filters);
        self
    }
}

/// A hit inside one line. Offsets are counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHit {
    pub column: usize,
    pub length: usize,
}

/// A hit produced by the scanner: 1-based line, char column and the
/// right-trimmed line text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub snippet: String,
}

impl LineMatch {
    pub fn new(line: usize, hit: LineHit, snippet: impl Into<String>) -> Self {
        Self {
            line,
            column: hit.column,
            length: hit.length,
            snippet: snippet.into(),
        }
    }
}

/// One located occurrence, detached from the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl MatchRecord {
    pub fn new(path: impl Into<PathBuf>, line: usize, column: usize, length: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            length,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMatches {
    pub path: PathBuf,
    pub matches: Vec<LineMatch>,
}

#[derive(Debug, Clone)]
pub enum GlobalSearchMessage {
    FileMatches {
        search_id: u64,
        file_matches: FileMatches,
    },
    Progress {
        search_id: u64,
        files_searched: usize,
        files_with_matches: usize,
    },
    /// Always the last message of a search, also when it was cancelled or
    /// the worker died part way.
    Complete {
        search_id: u64,
        total_files: usize,
        total_matches: usize,
        cancelled: bool,
    },
}

impl GlobalSearchMessage {
    pub fn search_id(&self) -> u64 {
        match self {
            GlobalSearchMessage::FileMatches { search_id, .. }
            | GlobalSearchMessage::Progress { search_id, .. }
            | GlobalSearchMessage::Complete { search_id, .. } => *search_id,
        }
    }
}
