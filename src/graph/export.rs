//! Cypher script export.
//!
//! Nodes become `MERGE (n:Label {node_key: '<key>'}) SET n += {properties}`
//! and edges become `MATCH ... MERGE (a)-[:REL]->(b)` on the same `node_key`.
//! `node_key` is the stored JSON key, null fields included, so two nodes that
//! differ only in a missing document number stay two nodes, and replaying
//! the script against a property-graph database is idempotent.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use super::{NodeId, SqliteGraphStore, StoredNode};
use crate::error::{LegalKgError, Result};

const IDENTITY_PROPERTY: &str = "node_key";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Write every node, then every edge, one statement per line.
pub fn write_cypher<W: Write>(store: &SqliteGraphStore, out: &mut W) -> Result<ExportSummary> {
    let nodes = store.nodes(None)?;
    let edges = store.edges()?;

    for node in &nodes {
        writeln!(
            out,
            "MERGE (n:{} {}) SET n += {};",
            node.label,
            identity(node),
            cypher_literal(&node.properties)
        )?;
    }

    let by_id: HashMap<NodeId, &StoredNode> = nodes.iter().map(|n| (n.id, n)).collect();
    let lookup = |id: NodeId| {
        by_id
            .get(&id)
            .copied()
            .ok_or_else(|| LegalKgError::InvalidInput(format!("edge references missing node {}", id)))
    };

    for edge in &edges {
        let source = lookup(edge.source)?;
        let target = lookup(edge.target)?;
        writeln!(
            out,
            "MATCH (a:{} {}), (b:{} {}) MERGE (a)-[:{}]->(b);",
            source.label,
            identity(source),
            target.label,
            identity(target),
            edge.relation
        )?;
    }

    out.flush()?;
    Ok(ExportSummary {
        nodes: nodes.len(),
        edges: edges.len(),
    })
}

/// `{node_key: '[30,"12/2020/TT-BKHCN"]'}`, the property every exported node is merged on.
fn identity(node: &StoredNode) -> String {
    format!("{{{}: {}}}", IDENTITY_PROPERTY, cypher_string(&node.key_json()))
}

fn cypher_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => cypher_string(s),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(cypher_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("`{}`: {}", k.replace('`', "``"), cypher_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn cypher_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
