//! Heading outline extraction.
//!
//! Builds the table-of-contents model straight from markdown source and
//! owns [`slug`], the one id rule shared with the renderer. Heading targets
//! in a rendered [`Document`](crate::document::Document) and TOC entries
//! only line up because both sides call the same function.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Line-anchored ATX heading: 1-6 hashes, whitespace, then the title.
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(.*)$").expect("heading pattern is valid")
});

/// One entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Slug of the title, used as the navigation target
    pub id: String,
    /// Heading text with the markup removed
    pub title: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Derive a heading id from its text.
///
/// The text is lower-cased and every maximal run of characters outside
/// `[A-Za-z0-9_]` becomes a single `-`. Separators at either end are kept.
///
/// # Example
///
/// ```
/// use marginalia::outline::slug;
///
/// assert_eq!(slug("Key Characteristics"), "key-characteristics");
/// assert_eq!(slug("What is Decentralization?"), "what-is-decentralization-");
/// ```
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_separator = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_separator = false;
        } else if !in_separator {
            out.push('-');
            in_separator = true;
        }
    }
    out
}

/// Build the outline for `source`, one entry per heading line in order.
///
/// Source without headings yields an empty outline.
///
/// # Example
///
/// ```
/// use marginalia::outline::build_outline;
///
/// let outline = build_outline("# Title\n\nText\n\n## Sub");
/// assert_eq!(outline.len(), 2);
/// assert_eq!(outline[1].id, "sub");
/// assert_eq!(outline[1].level, 2);
/// ```
pub fn build_outline(source: &str) -> Vec<OutlineEntry> {
    source
        .split('\n')
        .filter_map(|line| heading_entry(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Outline entry for a single source line, if it is a heading line.
pub fn heading_entry(line: &str) -> Option<OutlineEntry> {
    let caps = HEADING_LINE.captures(line)?;
    let hashes = caps.get(1)?.as_str();
    let title = caps.get(2).map_or("", |m| m.as_str()).trim();
    // Hash run is at most six long
    #[allow(clippy::cast_possible_truncation)]
    let level = hashes.len() as u8;
    Some(OutlineEntry {
        id: slug(title),
        title: title.to_string(),
        level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(id: &str, title: &str, level: u8) -> OutlineEntry {
        OutlineEntry {
            id: id.to_string(),
            title: title.to_string(),
            level,
        }
    }

    #[test]
    fn test_title_and_sub_heading() {
        let outline = build_outline("# Title\n\nText\n\n## Sub");
        assert_eq!(
            outline,
            vec![entry("title", "Title", 1), entry("sub", "Sub", 2)]
        );
    }

    #[test]
    fn test_empty_source_gives_empty_outline() {
        assert!(build_outline("").is_empty());
        assert!(build_outline("just a paragraph\n\nand another").is_empty());
    }

    #[test]
    fn test_levels_follow_hash_count() {
        let md = "# a\n## b\n### c\n#### d\n##### e\n###### f";
        let levels: Vec<u8> = build_outline(md).iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_seven_hashes_is_not_a_heading() {
        assert!(build_outline("####### too deep").is_empty());
    }

    #[test]
    fn test_hash_without_whitespace_is_not_a_heading() {
        assert!(build_outline("#hashtag\n##nope").is_empty());
    }

    #[test]
    fn test_indented_hash_is_not_a_heading() {
        assert!(build_outline("  # indented").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let outline = build_outline("# One\r\n\r\n## Two\r\n");
        assert_eq!(outline, vec![entry("one", "One", 1), entry("two", "Two", 2)]);
    }

    #[test]
    fn test_title_whitespace_is_trimmed() {
        let outline = build_outline("##    Spaced out   ");
        assert_eq!(outline, vec![entry("spaced-out", "Spaced out", 2)]);
    }

    #[test]
    fn test_slug_keeps_trailing_separator() {
        assert_eq!(slug("What is Decentralization?"), "what-is-decentralization-");
    }

    #[test]
    fn test_slug_keeps_leading_separator() {
        assert_eq!(slug("(Draft) Notes"), "-draft-notes");
    }

    #[test]
    fn test_slug_collapses_runs() {
        assert_eq!(
            slug("Distributed Ledger Technology (DLT)"),
            "distributed-ledger-technology-dlt-"
        );
        assert_eq!(slug("a -- b"), "a-b");
    }

    #[test]
    fn test_slug_keeps_underscores_and_digits() {
        assert_eq!(slug("snake_case v2"), "snake_case-v2");
    }

    #[test]
    fn test_slug_non_ascii_letters_become_separators() {
        assert_eq!(slug("Café Menu"), "caf-menu");
    }

    #[test]
    fn test_duplicate_titles_share_an_id() {
        let outline = build_outline("## Notes\n\n## Notes");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].id, outline[1].id);
    }

    #[test]
    fn test_fenced_hash_lines_are_scanned_literally() {
        let outline = build_outline("```python\n# comment\n```");
        assert_eq!(outline, vec![entry("comment", "comment", 1)]);
    }

    #[test]
    fn test_sample_post_outline() {
        let post = crate::blog::sample_posts()
            .into_iter()
            .find(|p| p.id == "4")
            .unwrap();
        let ids: Vec<String> = build_outline(&post.content)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "understanding-decentralized-systems",
                "introduction",
                "what-is-decentralization-",
                "key-characteristics",
                "benefits-of-decentralized-systems",
                "examples-of-decentralized-technologies",
                "challenges-and-future-outlook",
                "conclusion",
            ]
        );
    }

    fn heading_line() -> impl Strategy<Value = String> {
        (1usize..=6, "[A-Za-z][A-Za-z0-9 ?!]{0,20}")
            .prop_map(|(level, title)| format!("{} {}", "#".repeat(level), title))
    }

    fn body_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-z ]{0,30}",
            "#{7,9} [a-z]{1,5}",
            "#[a-z]{1,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_outline_counts_heading_lines(
            lines in prop::collection::vec(
                prop_oneof![heading_line().prop_map(|l| (true, l)), body_line().prop_map(|l| (false, l))],
                0..40,
            )
        ) {
            let expected: Vec<String> = lines
                .iter()
                .filter(|(is_heading, _)| *is_heading)
                .map(|(_, line)| line.trim_start_matches('#').trim().to_string())
                .collect();
            let source = lines.iter().map(|(_, l)| l.as_str()).collect::<Vec<_>>().join("\n");
            let titles: Vec<String> = build_outline(&source).into_iter().map(|e| e.title).collect();
            prop_assert_eq!(titles, expected);
        }

        #[test]
        fn prop_slug_is_deterministic(title in "\\PC{0,40}") {
            let first = slug(&title);
            prop_assert_eq!(&first, &slug(&title));
            prop_assert!(!first.contains("--"));
        }
    }
}
