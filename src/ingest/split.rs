//! Numbered sub-paragraph splitting of article bodies.

use regex::Regex;
use std::sync::LazyLock;

use super::unit::ContentUnit;

/// `<digits>.` at the start of the body or after whitespace.
static PARAGRAPH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d+\.)").expect("paragraph marker pattern is valid"));

/// Split a body into the runs that start with a paragraph marker.
///
/// Each run extends up to the whitespace before the next marker, or to the
/// end of the body. Text before the first marker is not part of any run.
pub fn split_paragraphs(body: &str) -> Vec<&str> {
    // (start of the run, start of the whole match including leading whitespace)
    let markers: Vec<(usize, usize)> = PARAGRAPH_MARKER
        .captures_iter(body)
        .filter_map(|captures| Some((captures.get(1)?.start(), captures.get(0)?.start())))
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(idx, &(run_start, _))| {
            let run_end = markers
                .get(idx + 1)
                .map_or(body.len(), |&(_, next_match)| next_match);
            body[run_start..run_end].trim()
        })
        .collect()
}

/// Expand a unit into one unit per numbered paragraph of its body.
///
/// Units without numbered paragraphs come back unchanged. Split units keep
/// every field except `body` and `article_number`, which gains a 1-based
/// `.N` suffix.
pub fn split_unit(unit: ContentUnit) -> Vec<ContentUnit> {
    let paragraphs: Vec<String> = split_paragraphs(&unit.body)
        .into_iter()
        .map(str::to_string)
        .collect();

    if paragraphs.is_empty() {
        return vec![unit];
    }

    paragraphs
        .into_iter()
        .enumerate()
        .map(|(idx, body)| ContentUnit {
            article_number: format!("{}.{}", unit.article_number, idx + 1),
            body,
            ..unit.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::unit::{Hierarchy, HierarchyLevel};

    fn unit_with_body(body: &str) -> ContentUnit {
        ContentUnit {
            document_number: Some("01/2022/TT-BTC".to_string()),
            article_number: "4".to_string(),
            title: "Nguyên tắc".to_string(),
            body: body.to_string(),
            hierarchy: Hierarchy::default().with(HierarchyLevel::Chapter, "Chương I"),
        }
    }

    #[test]
    fn test_split_two_paragraphs() {
        let units = split_unit(unit_with_body("1. Foo bar. 2. Baz qux."));

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].article_number, "4.1");
        assert_eq!(units[0].body, "1. Foo bar.");
        assert_eq!(units[1].article_number, "4.2");
        assert_eq!(units[1].body, "2. Baz qux.");
        assert!(units.iter().all(|u| u.title == "Nguyên tắc"));
        assert!(units.iter().all(|u| u.hierarchy.chapter.as_deref() == Some("Chương I")));
    }

    #[test]
    fn test_plain_body_is_not_split() {
        let units = split_unit(unit_with_body("Plain text only."));

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].article_number, "4");
        assert_eq!(units[0].body, "Plain text only.");
    }

    #[test]
    fn test_empty_body_is_not_split() {
        let units = split_unit(unit_with_body(""));
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].article_number, "4");
    }

    #[test]
    fn test_leading_text_before_first_marker_is_dropped() {
        assert_eq!(
            split_paragraphs("Quy định như sau: 1. Một. 2. Hai."),
            vec!["1. Một.", "2. Hai."]
        );
    }

    #[test]
    fn test_marker_requires_preceding_whitespace() {
        // "điểm a.1." is not a marker: the digit follows a letter
        assert_eq!(split_paragraphs("1. Theo điểm a.1. nêu trên"), vec!["1. Theo điểm a.1. nêu trên"]);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        assert_eq!(split_paragraphs("1. Một  2. Hai "), vec!["1. Một", "2. Hai"]);
    }
}
