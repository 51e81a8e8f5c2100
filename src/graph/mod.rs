//! Legal knowledge graph: node model, store, writer and read side.
//!
//! ```text
//! Grouping ─CONTAINS→ Document ─CONTAINS→ [Part] → [Chapter] → [Section] → [Subsection]
//!                                   │                                         │
//!                                   └──── CONTAINS (no hierarchy) ──→ Content ←┘ TERMINALLY_CONTAINS
//! ```

mod export;
mod store;
mod traversal;
mod writer;

pub use export::{write_cypher, ExportSummary};
pub use store::{GraphStore, MergedNode, SqliteGraphStore};
pub use traversal::{ancestor_path, descendants};
pub use writer::{GraphWriter, WriteSummary};

use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::LegalKgError;
use crate::ingest::unit::{ContentUnit, HierarchyLevel};

/// Row id of a node in the store.
pub type NodeId = i64;

/// Node labels of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeLabel {
    Grouping,
    Document,
    Part,
    Chapter,
    Section,
    Subsection,
    Article,
    Clause,
    Point,
    Content,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 10] = [
        NodeLabel::Grouping,
        NodeLabel::Document,
        NodeLabel::Part,
        NodeLabel::Chapter,
        NodeLabel::Section,
        NodeLabel::Subsection,
        NodeLabel::Article,
        NodeLabel::Clause,
        NodeLabel::Point,
        NodeLabel::Content,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grouping => "Grouping",
            Self::Document => "Document",
            Self::Part => "Part",
            Self::Chapter => "Chapter",
            Self::Section => "Section",
            Self::Subsection => "Subsection",
            Self::Article => "Article",
            Self::Clause => "Clause",
            Self::Point => "Point",
            Self::Content => "Content",
        }
    }

    /// Property names that make up the node's identity, in key order.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            Self::Grouping => &["id"],
            Self::Document => &["id", "document_number"],
            Self::Content => &["article_number", "document_number"],
            _ => &["name", "document_number"],
        }
    }
}

impl From<HierarchyLevel> for NodeLabel {
    fn from(level: HierarchyLevel) -> Self {
        match level {
            HierarchyLevel::Part => Self::Part,
            HierarchyLevel::Chapter => Self::Chapter,
            HierarchyLevel::Section => Self::Section,
            HierarchyLevel::Subsection => Self::Subsection,
            HierarchyLevel::Article => Self::Article,
            HierarchyLevel::Clause => Self::Clause,
            HierarchyLevel::Point => Self::Point,
        }
    }
}

impl FromStr for NodeLabel {
    type Err = LegalKgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| LegalKgError::Parse(format!("unknown node label: {}", s)))
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Edge types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    /// Outer node's subdivision includes the inner node
    Contains,
    /// Deepest hierarchy node to its Content leaf
    TerminallyContains,
}

impl RelationKind {
    pub const ALL: [RelationKind; 2] = [RelationKind::Contains, RelationKind::TerminallyContains];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::TerminallyContains => "TERMINALLY_CONTAINS",
        }
    }
}

impl FromStr for RelationKind {
    type Err = LegalKgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LegalKgError::Parse(format!("unknown relation type: {}", s)))
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A node to merge: label, identity key and the properties to store.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: Vec<Value>,
    pub properties: Value,
}

impl NodeRef {
    /// Build a node whose key is taken from `properties` by the label's key fields.
    fn from_properties(label: NodeLabel, properties: Value) -> Self {
        let key = key_values(label, &properties);
        Self { label, key, properties }
    }

    pub fn grouping(id: i64) -> Self {
        Self::from_properties(NodeLabel::Grouping, json!({ "id": id }))
    }

    pub fn document(id: i64, document_number: Option<&str>) -> Self {
        Self::from_properties(
            NodeLabel::Document,
            json!({ "id": id, "document_number": document_number }),
        )
    }

    pub fn level(level: HierarchyLevel, name: &str, document_number: Option<&str>) -> Self {
        Self::from_properties(
            level.into(),
            json!({ "name": name, "document_number": document_number }),
        )
    }

    pub fn content(unit: &ContentUnit) -> Self {
        Self::from_properties(
            NodeLabel::Content,
            json!({
                "article_number": unit.article_number,
                "document_number": unit.document_number,
                "title": unit.title,
                "body": unit.body,
            }),
        )
    }

    /// JSON text stored in the `node_key` column.
    pub fn key_json(&self) -> String {
        Value::Array(self.key.clone()).to_string()
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.label, Value::Array(self.key.clone()))
    }
}

/// Key field values of `properties`, in key order; absent fields are `null`.
fn key_values(label: NodeLabel, properties: &Value) -> Vec<Value> {
    label
        .key_fields()
        .iter()
        .map(|field| properties.get(*field).cloned().unwrap_or(Value::Null))
        .collect()
}

/// A node read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredNode {
    pub id: NodeId,
    pub label: NodeLabel,
    pub properties: Value,
}

impl StoredNode {
    /// Identity key in the same JSON form as [`NodeRef::key_json`].
    pub fn key_json(&self) -> String {
        Value::Array(key_values(self.label, &self.properties)).to_string()
    }
}

/// A directed edge read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub relation: RelationKind,
    pub target: NodeId,
}
