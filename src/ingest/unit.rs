use serde::{Deserialize, Serialize};

/// Structural tiers of a legal document, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HierarchyLevel {
    Part,
    Chapter,
    Section,
    Subsection,
    Article,
    Clause,
    Point,
}

impl HierarchyLevel {
    /// All levels in containment order.
    pub const ALL: [HierarchyLevel; 7] = [
        HierarchyLevel::Part,
        HierarchyLevel::Chapter,
        HierarchyLevel::Section,
        HierarchyLevel::Subsection,
        HierarchyLevel::Article,
        HierarchyLevel::Clause,
        HierarchyLevel::Point,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Part => "Part",
            Self::Chapter => "Chapter",
            Self::Section => "Section",
            Self::Subsection => "Subsection",
            Self::Article => "Article",
            Self::Clause => "Clause",
            Self::Point => "Point",
        }
    }
}

/// Heading text active for each level at some point of a document.
///
/// The structural parser fills `part` through `subsection`; `article`,
/// `clause` and `point` are carried for producers that resolve finer levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub part: Option<String>,
    pub chapter: Option<String>,
    pub section: Option<String>,
    pub subsection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
}

impl Hierarchy {
    pub fn get(&self, level: HierarchyLevel) -> Option<&str> {
        match level {
            HierarchyLevel::Part => self.part.as_deref(),
            HierarchyLevel::Chapter => self.chapter.as_deref(),
            HierarchyLevel::Section => self.section.as_deref(),
            HierarchyLevel::Subsection => self.subsection.as_deref(),
            HierarchyLevel::Article => self.article.as_deref(),
            HierarchyLevel::Clause => self.clause.as_deref(),
            HierarchyLevel::Point => self.point.as_deref(),
        }
    }

    /// Replace one level, leaving every other level untouched.
    pub fn with(mut self, level: HierarchyLevel, heading: impl Into<String>) -> Self {
        let heading = Some(heading.into());
        match level {
            HierarchyLevel::Part => self.part = heading,
            HierarchyLevel::Chapter => self.chapter = heading,
            HierarchyLevel::Section => self.section = heading,
            HierarchyLevel::Subsection => self.subsection = heading,
            HierarchyLevel::Article => self.article = heading,
            HierarchyLevel::Clause => self.clause = heading,
            HierarchyLevel::Point => self.point = heading,
        }
        self
    }

    /// Present levels in containment order.
    pub fn levels(&self) -> impl Iterator<Item = (HierarchyLevel, &str)> + '_ {
        HierarchyLevel::ALL
            .into_iter()
            .filter_map(move |level| self.get(level).map(|name| (level, name)))
    }

    pub fn is_empty(&self) -> bool {
        self.levels().next().is_none()
    }
}

/// Leaf record of legal text: one article, or one numbered paragraph of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub document_number: Option<String>,
    /// Article ordinal, suffixed `.N` for the N-th numbered paragraph.
    pub article_number: String,
    pub title: String,
    pub body: String,
    #[serde(flatten)]
    pub hierarchy: Hierarchy,
}
