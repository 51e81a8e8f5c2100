use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{Edge, NodeId, NodeLabel, NodeRef, RelationKind, StoredNode};
use crate::error::{LegalKgError, Result};

/// Outcome of a node merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedNode {
    pub id: NodeId,
    pub created: bool,
}

/// Idempotent mutations the graph writer needs from a property-graph backend.
///
/// Every call is one independent request; the writer never spans a
/// transaction across calls.
pub trait GraphStore {
    /// Create the node if no node with the same label and key exists, else reuse it
    fn merge_node(&mut self, node: &NodeRef) -> Result<MergedNode>;

    /// Create the edge if absent. Returns `true` when it was created.
    fn merge_edge(&mut self, source: NodeId, relation: RelationKind, target: NodeId) -> Result<bool>;
}

/// Property graph kept in the `nodes` / `edges` tables.
pub struct SqliteGraphStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteGraphStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_node(&self, node: &NodeRef) -> Result<Option<NodeId>> {
        let id = self
            .conn
            .query_row(
                "SELECT node_id FROM nodes WHERE label = ?1 AND node_key = ?2",
                params![node.label.as_str(), node.key_json()],
                |row| row.get::<_, NodeId>(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Result<Option<StoredNode>> {
        let row = self
            .conn
            .query_row(
                "SELECT node_id, label, properties FROM nodes WHERE node_id = ?1",
                params![id],
                |row| Ok((row.get::<_, NodeId>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;

        row.map(|(id, label, properties)| stored_node(id, label, properties))
            .transpose()
    }

    /// All nodes ordered by id, optionally restricted to one label
    pub fn nodes(&self, label: Option<NodeLabel>) -> Result<Vec<StoredNode>> {
        let mut stmt = self.conn.prepare(
            "SELECT node_id, label, properties FROM nodes \
             WHERE ?1 IS NULL OR label = ?1 ORDER BY node_id",
        )?;
        let rows = stmt.query_map(params![label.map(NodeLabel::as_str)], |row| {
            Ok((row.get::<_, NodeId>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            let (id, label, properties) = row?;
            nodes.push(stored_node(id, label, properties)?);
        }
        Ok(nodes)
    }

    pub fn edges(&self) -> Result<Vec<Edge>> {
        self.query_edges(
            "SELECT source_id, rel_type, target_id FROM edges ORDER BY source_id, target_id, rel_type",
            Vec::new(),
        )
    }

    /// Edges leaving `source`, optionally restricted to some relation kinds
    pub fn outgoing(&self, source: NodeId, relations: Option<&[RelationKind]>) -> Result<Vec<Edge>> {
        self.adjacent("source_id", source, relations)
    }

    /// Edges entering `target`, optionally restricted to some relation kinds
    pub fn incoming(&self, target: NodeId, relations: Option<&[RelationKind]>) -> Result<Vec<Edge>> {
        self.adjacent("target_id", target, relations)
    }

    fn adjacent(&self, column: &str, id: NodeId, relations: Option<&[RelationKind]>) -> Result<Vec<Edge>> {
        let mut query = format!(
            "SELECT source_id, rel_type, target_id FROM edges WHERE {} = ?",
            column
        );
        let mut values = vec![SqlValue::Integer(id)];

        if let Some(kinds) = relations {
            let placeholders = kinds.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            query.push_str(&format!(" AND rel_type IN ({})", placeholders));
            values.extend(kinds.iter().map(|kind| SqlValue::Text(kind.as_str().to_string())));
        }
        query.push_str(" ORDER BY source_id, target_id");

        self.query_edges(&query, values)
    }

    fn query_edges(&self, query: &str, values: Vec<SqlValue>) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok((row.get::<_, NodeId>(0)?, row.get::<_, String>(1)?, row.get::<_, NodeId>(2)?))
        })?;

        let mut edges = Vec::new();
        for row in rows {
            let (source, relation, target) = row?;
            edges.push(Edge {
                source,
                relation: relation.parse()?,
                target,
            });
        }
        Ok(edges)
    }

    /// Node counts per label, in label order, omitting absent labels.
    pub fn count_nodes_by_label(&self) -> Result<Vec<(NodeLabel, i64)>> {
        let mut counts = Vec::new();
        for label in NodeLabel::ALL {
            let count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM nodes WHERE label = ?1",
                params![label.as_str()],
                |row| row.get(0),
            )?;
            if count > 0 {
                counts.push((label, count));
            }
        }
        Ok(counts)
    }

    pub fn count_edges_by_relation(&self) -> Result<Vec<(RelationKind, i64)>> {
        let mut counts = Vec::new();
        for kind in RelationKind::ALL {
            let count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM edges WHERE rel_type = ?1",
                params![kind.as_str()],
                |row| row.get(0),
            )?;
            counts.push((kind, count));
        }
        Ok(counts)
    }
}

impl GraphStore for SqliteGraphStore<'_> {
    fn merge_node(&mut self, node: &NodeRef) -> Result<MergedNode> {
        let key = node.key_json();
        let properties = node.properties.to_string();

        // Single statement merge: the UNIQUE(label, node_key) constraint decides
        let inserted = self.conn.execute(
            "INSERT INTO nodes (label, node_key, properties) VALUES (?1, ?2, ?3) \
             ON CONFLICT(label, node_key) DO NOTHING",
            params![node.label.as_str(), key, properties],
        )?;

        if inserted > 0 {
            return Ok(MergedNode {
                id: self.conn.last_insert_rowid(),
                created: true,
            });
        }

        let id: NodeId = self.conn.query_row(
            "SELECT node_id FROM nodes WHERE label = ?1 AND node_key = ?2",
            params![node.label.as_str(), key],
            |row| row.get(0),
        )?;

        // Content text follows the latest parse; structural nodes keep their first properties
        if node.label == NodeLabel::Content {
            self.conn.execute(
                "UPDATE nodes SET properties = ?1 WHERE node_id = ?2",
                params![properties, id],
            )?;
        }

        Ok(MergedNode { id, created: false })
    }

    fn merge_edge(&mut self, source: NodeId, relation: RelationKind, target: NodeId) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO edges (source_id, rel_type, target_id) VALUES (?1, ?2, ?3) \
             ON CONFLICT(source_id, rel_type, target_id) DO NOTHING",
            params![source, relation.as_str(), target],
        )?;
        Ok(inserted > 0)
    }
}

fn stored_node(id: NodeId, label: String, properties: String) -> Result<StoredNode> {
    let properties = serde_json::from_str(&properties)
        .map_err(|e| LegalKgError::Parse(format!("properties of node {}: {}", id, e)))?;
    Ok(StoredNode {
        id,
        label: label.parse()?,
        properties,
    })
}
