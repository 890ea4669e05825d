//! 搜索模式编译
//!
//! 按顺序应用：非正则时转义 → 全词匹配时加 `\b` → 大小写选项。
//! 每行只取第一个匹配，列号和长度按字符计。

use crate::kernel::services::ports::search::{LineHit, Result, SearchOptions};
use regex::{Match, Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    pub fn compile(pattern: &str, options: &SearchOptions) -> Result<Self> {
        let mut source = if options.use_regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        if options.whole_word {
            source = format!(r"\b(?:{})\b", source);
        }

        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// First hit in the line.
    pub fn search(&self, line: &str) -> Option<LineHit> {
        self.regex.find(line).map(|m| to_hit(line, m))
    }

    /// The hit that starts exactly at `column`, if the pattern still matches there.
    pub fn find_at(&self, line: &str, column: usize) -> Option<LineHit> {
        let start = char_to_byte(line, column)?;
        self.regex
            .find_at(line, start)
            .filter(|m| m.start() == start)
            .map(|m| to_hit(line, m))
    }

    /// Every non-overlapping hit in the line, left to right.
    pub fn find_all(&self, line: &str) -> Vec<LineHit> {
        self.regex.find_iter(line).map(|m| to_hit(line, m)).collect()
    }
}

fn to_hit(line: &str, m: Match<'_>) -> LineHit {
    LineHit {
        column: line[..m.start()].chars().count(),
        length: m.as_str().chars().count(),
    }
}

fn char_to_byte(line: &str, column: usize) -> Option<usize> {
    line.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .nth(column)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/pattern.rs"]
mod tests;
