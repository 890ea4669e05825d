//! Rendered side of a dual-pane view.
//!
//! Markdown is rendered to HTML by a small line classifier (headings, lists,
//! quotes, fences, rules, paragraphs) plus inline code spans, emphasis and
//! links. HTML sources are shown as-is with the file URL as link base.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Markdown,
    Html,
}

impl PreviewKind {
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preview {
    kind: PreviewKind,
    html: String,
    base_url: Option<String>,
    rendered_version: Option<u64>,
}

impl Preview {
    pub fn new(kind: PreviewKind, path: Option<&Path>) -> Self {
        Self {
            kind,
            html: String::new(),
            base_url: path.map(file_url),
            rendered_version: None,
        }
    }

    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Base for relative links (`<img src=…>`) of HTML previews.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn set_path(&mut self, path: &Path) {
        self.base_url = Some(file_url(path));
    }

    pub fn is_stale(&self, version: u64) -> bool {
        self.rendered_version != Some(version)
    }

    pub fn render(&mut self, source: &str, version: u64) {
        self.html = match self.kind {
            PreviewKind::Markdown => render_markdown(source),
            PreviewKind::Html => source.to_string(),
        };
        self.rendered_version = Some(version);
    }
}

pub fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MdBlockKind {
    Blank,
    Heading(u8),
    UnorderedItem,
    OrderedItem,
    BlockQuote,
    FenceMarker,
    HorizontalRule,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

enum OpenBlock {
    None,
    Paragraph(Vec<String>),
    Quote(Vec<String>),
    List(ListKind),
}

pub fn render_markdown(src: &str) -> String {
    let mut out = String::with_capacity(src.len() * 2);
    let mut open = OpenBlock::None;
    let mut in_fence = false;

    for line in src.lines() {
        let trimmed = line.trim_start();

        if in_fence {
            if trimmed.starts_with("```") {
                out.push_str("</code></pre>\n");
                in_fence = false;
            } else {
                escape_into(&mut out, line);
                out.push('\n');
            }
            continue;
        }

        let kind = classify_line(trimmed);
        match kind {
            MdBlockKind::Paragraph => {
                if let OpenBlock::Paragraph(lines) = &mut open {
                    lines.push(trimmed.to_string());
                } else {
                    close_block(&mut out, &mut open);
                    open = OpenBlock::Paragraph(vec![trimmed.to_string()]);
                }
            }
            MdBlockKind::BlockQuote => {
                let body = trimmed[1..].trim_start().to_string();
                if let OpenBlock::Quote(lines) = &mut open {
                    lines.push(body);
                } else {
                    close_block(&mut out, &mut open);
                    open = OpenBlock::Quote(vec![body]);
                }
            }
            MdBlockKind::UnorderedItem | MdBlockKind::OrderedItem => {
                let list = if kind == MdBlockKind::UnorderedItem {
                    ListKind::Unordered
                } else {
                    ListKind::Ordered
                };
                if !matches!(open, OpenBlock::List(k) if k == list) {
                    close_block(&mut out, &mut open);
                    out.push_str(match list {
                        ListKind::Unordered => "<ul>\n",
                        ListKind::Ordered => "<ol>\n",
                    });
                    open = OpenBlock::List(list);
                }
                out.push_str("<li>");
                out.push_str(&render_inline(list_item_body(trimmed)));
                out.push_str("</li>\n");
            }
            MdBlockKind::Heading(level) => {
                close_block(&mut out, &mut open);
                let body = trimmed[level as usize..].trim().trim_end_matches('#').trim_end();
                out.push_str(&format!(
                    "<h{level}>{}</h{level}>\n",
                    render_inline(body),
                    level = level
                ));
            }
            MdBlockKind::FenceMarker => {
                close_block(&mut out, &mut open);
                let lang = trimmed.trim_start_matches('`').trim();
                if lang.is_empty() {
                    out.push_str("<pre><code>");
                } else {
                    out.push_str("<pre><code class=\"language-");
                    escape_into(&mut out, lang);
                    out.push_str("\">");
                }
                in_fence = true;
            }
            MdBlockKind::HorizontalRule => {
                close_block(&mut out, &mut open);
                out.push_str("<hr />\n");
            }
            MdBlockKind::Blank => close_block(&mut out, &mut open),
        }
    }

    if in_fence {
        out.push_str("</code></pre>\n");
    }
    close_block(&mut out, &mut open);
    out
}

fn close_block(out: &mut String, open: &mut OpenBlock) {
    match std::mem::replace(open, OpenBlock::None) {
        OpenBlock::None => {}
        OpenBlock::Paragraph(lines) => {
            out.push_str("<p>");
            out.push_str(&render_inline(&lines.join("\n")));
            out.push_str("</p>\n");
        }
        OpenBlock::Quote(lines) => {
            out.push_str("<blockquote><p>");
            out.push_str(&render_inline(&lines.join("\n")));
            out.push_str("</p></blockquote>\n");
        }
        OpenBlock::List(ListKind::Unordered) => out.push_str("</ul>\n"),
        OpenBlock::List(ListKind::Ordered) => out.push_str("</ol>\n"),
    }
}

fn classify_line(trimmed: &str) -> MdBlockKind {
    if trimmed.is_empty() {
        return MdBlockKind::Blank;
    }
    if trimmed.starts_with("```") {
        return MdBlockKind::FenceMarker;
    }
    if is_horizontal_rule(trimmed) {
        return MdBlockKind::HorizontalRule;
    }

    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) {
        let rest = &trimmed[hashes..];
        if rest.is_empty() || rest.starts_with(' ') {
            return MdBlockKind::Heading(hashes as u8);
        }
    }

    if trimmed.starts_with('>') {
        return MdBlockKind::BlockQuote;
    }
    if ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m)) {
        return MdBlockKind::UnorderedItem;
    }

    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if rest.starts_with(". ") || rest.starts_with(") ") {
            return MdBlockKind::OrderedItem;
        }
    }

    MdBlockKind::Paragraph
}

fn is_horizontal_rule(trimmed: &str) -> bool {
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }
    let mut count = 0;
    for ch in trimmed.chars() {
        if ch == marker {
            count += 1;
        } else if !ch.is_whitespace() {
            return false;
        }
    }
    count >= 3
}

fn list_item_body(trimmed: &str) -> &str {
    match trimmed.find(|c: char| c == ' ') {
        Some(i) => trimmed[i..].trim_start(),
        None => "",
    }
}

fn render_inline(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut i = 0usize;
    let mut prev: Option<char> = None;

    while i < src.len() {
        let rest = &src[i..];

        if let Some(inner) = rest.strip_prefix('`') {
            if let Some(end) = inner.find('`') {
                out.push_str("<code>");
                escape_into(&mut out, &inner[..end]);
                out.push_str("</code>");
                i += end + 2;
                prev = Some('`');
                continue;
            }
        } else if let Some(inner) = rest.strip_prefix("**") {
            if let Some(end) = inner.find("**").filter(|&e| e > 0) {
                out.push_str("<strong>");
                out.push_str(&render_inline(&inner[..end]));
                out.push_str("</strong>");
                i += end + 4;
                prev = Some('*');
                continue;
            }
        } else if rest.starts_with('*') || rest.starts_with('_') {
            let marker = &rest[..1];
            // snake_case 之类的词内下划线不算强调
            let intraword = marker == "_" && prev.is_some_and(char::is_alphanumeric);
            if !intraword {
                if let Some(end) = rest[1..].find(marker).filter(|&e| e > 0) {
                    out.push_str("<em>");
                    out.push_str(&render_inline(&rest[1..1 + end]));
                    out.push_str("</em>");
                    i += end + 2;
                    prev = marker.chars().next();
                    continue;
                }
            }
        } else if rest.starts_with('[') {
            if let Some((text, url, consumed)) = parse_link(rest) {
                out.push_str("<a href=\"");
                escape_into(&mut out, url);
                out.push_str("\">");
                out.push_str(&render_inline(text));
                out.push_str("</a>");
                i += consumed;
                prev = Some(')');
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        escape_char(&mut out, ch);
        i += ch.len_utf8();
        prev = Some(ch);
    }

    out
}

fn parse_link(src: &str) -> Option<(&str, &str, usize)> {
    let close = src.find("](")?;
    let text = &src[1..close];
    let after = &src[close + 2..];
    let end = after.find(')')?;
    Some((text, &after[..end], close + 2 + end + 1))
}

fn escape_char(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        escape_char(out, ch);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/preview.rs"]
mod tests;
