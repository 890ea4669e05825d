use super::*;
use crate::kernel::services::ports::search::SearchError;

fn literal() -> SearchOptions {
    SearchOptions::default()
}

#[test]
fn test_literal_metacharacters_match_verbatim() {
    let samples = [
        "a.b",
        "foo(bar)",
        "[x]*+?",
        r"C:\path\to",
        "^start$",
        "{1,2}|pipe",
        "price: $5.00",
    ];
    for sample in samples {
        for case_sensitive in [false, true] {
            let options = literal().case_sensitive(case_sensitive);
            let pattern = CompiledPattern::compile(sample, &options).unwrap();
            let line = format!("xx {} yy", sample);
            let hit = pattern.search(&line).unwrap();
            assert_eq!(hit.column, 3, "{sample}");
            assert_eq!(hit.length, sample.chars().count(), "{sample}");
        }
        // 全词模式也必须能编译
        assert!(CompiledPattern::compile(sample, &literal().whole_word(true)).is_ok());
    }
}

#[test]
fn test_literal_does_not_act_as_regex() {
    let pattern = CompiledPattern::compile("a.c", &literal()).unwrap();
    assert!(pattern.search("abc").is_none());
    assert!(pattern.search("a.c").is_some());
}

#[test]
fn test_regex_mode() {
    let pattern = CompiledPattern::compile(r"hello\d+", &literal().regex(true)).unwrap();
    let hit = pattern.search("say hello123 now").unwrap();
    assert_eq!(hit, LineHit { column: 4, length: 8 });
}

#[test]
fn test_invalid_regex_is_reported() {
    let err = CompiledPattern::compile("(unclosed", &literal().regex(true)).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPattern(_)));
    assert!(err.to_string().starts_with("Invalid pattern"));
}

#[test]
fn test_case_sensitivity() {
    let insensitive = CompiledPattern::compile("Hello", &literal()).unwrap();
    assert!(insensitive.search("HELLO world").is_some());

    let sensitive = CompiledPattern::compile("Hello", &literal().case_sensitive(true)).unwrap();
    assert!(sensitive.search("HELLO world").is_none());
    assert!(sensitive.search("Hello world").is_some());
}

#[test]
fn test_whole_word() {
    let pattern = CompiledPattern::compile("cat", &literal().whole_word(true)).unwrap();
    assert!(pattern.search("concatenate").is_none());
    assert_eq!(pattern.search("the cat sat").unwrap().column, 4);
}

#[test]
fn test_whole_word_wraps_alternation() {
    let pattern =
        CompiledPattern::compile("cat|dog", &literal().regex(true).whole_word(true)).unwrap();
    assert!(pattern.search("dogma").is_none());
    assert!(pattern.search("hotdog").is_none());
    assert!(pattern.search("a dog").is_some());
}

#[test]
fn test_search_returns_first_hit_only() {
    let pattern = CompiledPattern::compile("ab", &literal()).unwrap();
    let hit = pattern.search("xxab ab ab").unwrap();
    assert_eq!(hit.column, 2);
    assert_eq!(pattern.find_at("xxab ab ab", 5).unwrap().column, 5);
}

#[test]
fn test_columns_are_counted_in_chars() {
    let pattern = CompiledPattern::compile("目标", &literal()).unwrap();
    let hit = pattern.search("中文 目标 text").unwrap();
    assert_eq!(hit, LineHit { column: 3, length: 2 });
}

#[test]
fn test_find_at_requires_exact_start() {
    let pattern = CompiledPattern::compile("foo", &literal()).unwrap();
    let line = "foo bar foo";
    assert_eq!(pattern.find_at(line, 8), Some(LineHit { column: 8, length: 3 }));
    assert_eq!(pattern.find_at(line, 0), Some(LineHit { column: 0, length: 3 }));
    assert_eq!(pattern.find_at(line, 4), None);
    assert_eq!(pattern.find_at(line, 1), None);
    assert_eq!(pattern.find_at(line, 99), None);
}

#[test]
fn test_find_at_keeps_word_boundaries_of_whole_line() {
    let pattern = CompiledPattern::compile("bar", &literal().whole_word(true)).unwrap();
    // "foobar": bar starts at 3 but is not a whole word there
    assert_eq!(pattern.find_at("foobar", 3), None);
    assert!(pattern.find_at("foo bar", 4).is_some());
}

#[test]
fn test_find_all_lists_every_hit_in_chars() {
    let pattern = CompiledPattern::compile("ab", &literal()).unwrap();
    assert_eq!(
        pattern.find_all("é ab abab"),
        vec![
            LineHit { column: 2, length: 2 },
            LineHit { column: 5, length: 2 },
            LineHit { column: 7, length: 2 },
        ]
    );
    assert!(pattern.find_all("nothing").is_empty());

    let word = CompiledPattern::compile("ab", &literal().whole_word(true)).unwrap();
    assert_eq!(word.find_all("ab abab ab").len(), 2);
}
