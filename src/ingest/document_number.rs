//! Document number ("số hiệu") extraction from header lines.

use regex::Regex;
use std::sync::LazyLock;

/// Marker that precedes a document number in the header.
pub const NUMBER_MARKER: &str = "Số:";

/// Vietnamese uppercase alphabet, including the extended letters.
const LETTERS: &str = "A-ZĂÂĐÊÔƠƯ";

/// Tried in order: three issuer segments, then two, then one.
static NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    (0..3)
        .rev()
        .map(|extra_segments| {
            let tail = format!("-[{LETTERS}]+").repeat(extra_segments);
            let pattern = format!(r"Số:\s*(\d+\s*/\d+/[{LETTERS}]+{tail})");
            Regex::new(&pattern).expect("document number pattern is valid")
        })
        .collect()
});

/// Extract the document number from one line, with all whitespace removed.
///
/// `"Số: 12/2020/TT-BKHCN"` yields `"12/2020/TT-BKHCN"`.
pub fn extract_document_number(line: &str) -> Option<String> {
    if !line.contains(NUMBER_MARKER) {
        return None;
    }

    NUMBER_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(line))
        .and_then(|captures| captures.get(1))
        .map(|number| number.as_str().split_whitespace().collect())
}
