use super::*;
use std::path::PathBuf;

#[test]
fn test_preview_kind_for_path() {
    assert_eq!(
        PreviewKind::for_path(Path::new("README.md")),
        Some(PreviewKind::Markdown)
    );
    assert_eq!(
        PreviewKind::for_path(Path::new("notes.MARKDOWN")),
        Some(PreviewKind::Markdown)
    );
    assert_eq!(
        PreviewKind::for_path(Path::new("index.htm")),
        Some(PreviewKind::Html)
    );
    assert_eq!(PreviewKind::for_path(Path::new("main.rs")), None);
    assert_eq!(PreviewKind::for_path(Path::new("Makefile")), None);
}

#[test]
fn test_html_preview_keeps_source_and_base_url() {
    let path = PathBuf::from("/site/index.html");
    let mut preview = Preview::new(PreviewKind::Html, Some(&path));
    preview.render("<img src=\"logo.png\">", 1);

    assert_eq!(preview.html(), "<img src=\"logo.png\">");
    assert_eq!(preview.base_url(), Some("file:///site/index.html"));
}

#[test]
fn test_staleness_follows_version() {
    let mut preview = Preview::new(PreviewKind::Markdown, None);
    assert!(preview.is_stale(0));

    preview.render("# a", 3);
    assert!(!preview.is_stale(3));
    assert!(preview.is_stale(4));
}

#[test]
fn test_file_url() {
    assert_eq!(file_url(Path::new("/a/b.html")), "file:///a/b.html");
}

#[test]
fn test_markdown_headings_and_paragraphs() {
    let html = render_markdown("# Title\n\nfirst line\nsecond line\n\n### Sub ###");
    assert_eq!(
        html,
        "<h1>Title</h1>\n<p>first line\nsecond line</p>\n<h3>Sub</h3>\n"
    );
}

#[test]
fn test_markdown_hash_without_space_is_text() {
    assert_eq!(render_markdown("#tag"), "<p>#tag</p>\n");
}

#[test]
fn test_markdown_lists() {
    let html = render_markdown("- one\n- two\n1. first\n2. second");
    assert_eq!(
        html,
        "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n"
    );
}

#[test]
fn test_markdown_fenced_code_is_escaped() {
    let html = render_markdown("```rust\nlet a = 1 < 2;\n```\nafter");
    assert_eq!(
        html,
        "<pre><code class=\"language-rust\">let a = 1 &lt; 2;\n</code></pre>\n<p>after</p>\n"
    );
}

#[test]
fn test_markdown_unclosed_fence() {
    assert_eq!(
        render_markdown("```\ncode"),
        "<pre><code>code\n</code></pre>\n"
    );
}

#[test]
fn test_markdown_quote_and_rule() {
    let html = render_markdown("> quoted\n> more\n\n---");
    assert_eq!(
        html,
        "<blockquote><p>quoted\nmore</p></blockquote>\n<hr />\n"
    );
}

#[test]
fn test_markdown_inline() {
    let html = render_markdown("use `a<b`, **bold**, *em* and [link](http://x.y)");
    assert_eq!(
        html,
        "<p>use <code>a&lt;b</code>, <strong>bold</strong>, <em>em</em> and <a href=\"http://x.y\">link</a></p>\n"
    );
}

#[test]
fn test_markdown_intraword_underscore() {
    assert_eq!(
        render_markdown("snake_case_name and _em_"),
        "<p>snake_case_name and <em>em</em></p>\n"
    );
}

#[test]
fn test_markdown_escapes_html() {
    assert_eq!(
        render_markdown("<script>alert('x')</script>"),
        "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>\n"
    );
}
