//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 光标和选区（字符偏移）
//! - 修改标记和版本号（预览根据版本号判断是否需要重新渲染）

use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::io::{self, Write};
use std::ops::Range;

/// 从 RopeSlice 获取字符串，优先零拷贝
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    rope: Rope,
    cursor: usize,
    selection: Option<Range<usize>>,
    modified: bool,
    version: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            ..Self::default()
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// 流式写入到 Writer，避免大文件 OOM
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Line text without its line ending. `row` is 0-based.
    pub fn line(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let raw = slice_to_cow(self.rope.line(row));
        let raw: &str = &raw;
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Some(line.to_string())
    }

    pub fn line_to_char(&self, row: usize) -> Option<usize> {
        (row < self.rope.len_lines()).then(|| self.rope.line_to_char(row))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, char_offset: usize) {
        self.cursor = char_offset.min(self.len_chars());
    }

    /// (0-based row, char column) of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let row = self.rope.char_to_line(self.cursor);
        (row, self.cursor - self.rope.line_to_char(row))
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection
            .as_ref()
            .map(|r| self.rope.slice(r.clone()).to_string())
    }

    /// Selects `range` (clamped to the text) and moves the cursor to its end.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.selection = Some(start..end);
        self.cursor = end;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Replaces the selection (or inserts at the cursor) with `text`.
    pub fn replace_selection(&mut self, text: &str) {
        let range = self
            .selection
            .take()
            .unwrap_or(self.cursor..self.cursor);
        self.replace_range(range, text);
    }

    pub fn insert(&mut self, text: &str) {
        self.replace_range(self.cursor..self.cursor, text);
    }

    pub fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.cursor = start + text.chars().count();
        self.selection = None;
        self.touch(true);
    }

    /// Replaces the whole content as an edit.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = self.cursor.min(self.len_chars());
        self.selection = None;
        self.touch(true);
    }

    /// Replaces the whole content with what is on disk: the cursor keeps its
    /// offset clamped to the new length and the buffer is clean afterwards.
    pub fn reload(&mut self, text: &str) {
        self.restore(Rope::from_str(text));
    }

    pub fn restore(&mut self, rope: Rope) {
        self.rope = rope;
        self.cursor = self.cursor.min(self.len_chars());
        self.selection = None;
        self.touch(false);
    }

    fn touch(&mut self, modified: bool) {
        self.modified = modified;
        self.version = self.version.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
