//! Structural parser: recovers the Part → Chapter → Section → Subsection →
//! Article outline of a legal text and emits one [`ContentUnit`] per article
//! (or per numbered paragraph of an article).
//!
//! Parsing is a fold over the document's lines. A [`ParseState`] value holds
//! the active headings, the document number and the article being collected;
//! each line consumes the state and yields the next one.

use std::ops::ControlFlow;

use crate::config::{default_signature_markers, ParserConfig};

use super::document_number::extract_document_number;
use super::split::split_unit;
use super::unit::{ContentUnit, Hierarchy, HierarchyLevel};

/// Heading keywords in priority order. `Điều` (article) is handled separately.
const HEADING_PREFIXES: &[(&str, HierarchyLevel)] = &[
    ("Phần", HierarchyLevel::Part),
    ("Chương", HierarchyLevel::Chapter),
    ("Mục", HierarchyLevel::Section),
    ("Tiểu mục", HierarchyLevel::Subsection),
];

const ARTICLE_PREFIX: &str = "Điều";

/// Classification of one trimmed, non-empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Start of the signature block; the substantive content has ended.
    Signature,
    Heading(HierarchyLevel, &'a str),
    Article { number: &'a str, title: &'a str },
    Body(&'a str),
}

/// Running state threaded through the fold.
#[derive(Debug, Default)]
struct ParseState {
    hierarchy: Hierarchy,
    document_number: Option<String>,
    number_search_done: bool,
    current: Option<ContentUnit>,
    emitted: Vec<ContentUnit>,
    ended_by_signature: bool,
}

impl ParseState {
    fn flush(mut self) -> Self {
        if let Some(unit) = self.current.take() {
            self.emitted.extend(split_unit(unit));
        }
        self
    }

    fn observe_document_number(mut self, text: &str) -> Self {
        if self.number_search_done {
            return self;
        }
        if let Some(number) = extract_document_number(text) {
            log::info!("Found document number: {}", number);
            self.document_number = Some(number);
            self.number_search_done = true;
        }
        self
    }

    fn enter_heading(mut self, level: HierarchyLevel, text: &str) -> Self {
        log::debug!("Found new {}: {}", level.as_str().to_lowercase(), text);
        self.hierarchy = self.hierarchy.with(level, text);
        self
    }

    fn start_article(self, number: &str, title: &str) -> Self {
        let mut state = self.flush();
        // The number search only runs in the document header.
        state.number_search_done = true;
        state.current = Some(ContentUnit {
            document_number: state.document_number.clone(),
            article_number: number.to_string(),
            title: title.to_string(),
            body: String::new(),
            hierarchy: state.hierarchy.clone(),
        });
        state
    }

    fn append_body(mut self, text: &str) -> Self {
        // Text before the first article has no unit to land in.
        if let Some(unit) = self.current.as_mut() {
            if !unit.body.is_empty() {
                unit.body.push(' ');
            }
            unit.body.push_str(text);
        }
        self
    }
}

/// Line-oriented parser for extracted legal document text
#[derive(Debug, Clone)]
pub struct StructureParser {
    signature_markers: Vec<String>,
}

impl Default for StructureParser {
    fn default() -> Self {
        Self::new(default_signature_markers())
    }
}

impl StructureParser {
    pub fn new(signature_markers: Vec<String>) -> Self {
        Self { signature_markers }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.signature_markers.clone())
    }

    pub fn is_signature_line(&self, text: &str) -> bool {
        self.signature_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
    }

    /// Classify a trimmed line. Signature markers win over every heading.
    pub fn classify<'a>(&self, text: &'a str) -> LineKind<'a> {
        if self.is_signature_line(text) {
            return LineKind::Signature;
        }

        if let Some(&(_, level)) = HEADING_PREFIXES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
        {
            return LineKind::Heading(level, text);
        }

        if text.starts_with(ARTICLE_PREFIX) {
            if let Some((number, title)) = parse_article_heading(text) {
                return LineKind::Article { number, title };
            }
        }

        LineKind::Body(text)
    }

    /// Parse a whole document into content units, in document order.
    pub fn parse(&self, text: &str) -> Vec<ContentUnit> {
        let folded = text
            .lines()
            .try_fold(ParseState::default(), |state, line| self.step(state, line));

        let state = match folded {
            ControlFlow::Continue(state) | ControlFlow::Break(state) => state,
        };

        // A signature break has already flushed the open unit.
        let state = if state.ended_by_signature { state } else { state.flush() };
        state.emitted
    }

    fn step(&self, state: ParseState, line: &str) -> ControlFlow<ParseState, ParseState> {
        let text = line.trim();
        if text.is_empty() {
            return ControlFlow::Continue(state);
        }

        let kind = self.classify(text);
        if kind == LineKind::Signature {
            log::debug!("Signature block reached: {}", text);
            let mut state = state.flush();
            state.ended_by_signature = true;
            return ControlFlow::Break(state);
        }

        let state = state.observe_document_number(text);

        ControlFlow::Continue(match kind {
            LineKind::Heading(level, heading) => state.enter_heading(level, heading),
            LineKind::Article { number, title } => state.start_article(number, title),
            LineKind::Body(body) => state.append_body(body),
            LineKind::Signature => state,
        })
    }
}

/// Split `"Điều 5. Phạm vi điều chỉnh"` into `("5", "Phạm vi điều chỉnh")`.
fn parse_article_heading(text: &str) -> Option<(&str, &str)> {
    let (_, rest) = text.split_once(' ')?;
    let (number, title) = rest.split_once('.').unwrap_or((rest, ""));
    let number = number.trim();
    if number.is_empty() {
        return None;
    }
    Some((number, title.trim()))
}
