//! Read side of the graph: BFS over edges and containment paths.

use std::collections::{HashSet, VecDeque};

use super::{Edge, NodeId, RelationKind, SqliteGraphStore, StoredNode};
use crate::error::{LegalKgError, Result};

/// Traverse the graph from `start` using BFS.
/// Returns every edge that reached a new node within `max_depth` hops.
pub fn descendants(
    store: &SqliteGraphStore,
    start: NodeId,
    relations: Option<&[RelationKind]>,
    max_depth: usize,
) -> Result<Vec<Edge>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut result = Vec::new();

    queue.push_back((start, 0));
    visited.insert(start);

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        for edge in store.outgoing(node, relations)? {
            if visited.insert(edge.target) {
                queue.push_back((edge.target, depth + 1));
                result.push(edge);
            }
        }
    }

    Ok(result)
}

/// Chain of containing nodes of `node`, outermost first, ending with `node` itself.
///
/// A content node is entered through its terminal edge when it has one. When
/// a node has several containers the one with the lowest id is followed.
pub fn ancestor_path(store: &SqliteGraphStore, node: NodeId) -> Result<Vec<StoredNode>> {
    let start = store
        .node(node)?
        .ok_or_else(|| LegalKgError::InvalidInput(format!("no node with id {}", node)))?;

    let mut path = vec![start];
    let mut visited = HashSet::from([node]);
    let mut current = node;

    loop {
        let incoming = store.incoming(current, None)?;
        let parent = incoming
            .iter()
            .find(|e| e.relation == RelationKind::TerminallyContains)
            .or_else(|| incoming.first())
            .map(|e| e.source);

        let Some(parent) = parent else { break };
        if !visited.insert(parent) {
            break;
        }
        if let Some(stored) = store.node(parent)? {
            path.push(stored);
        }
        current = parent;
    }

    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::graph::{GraphWriter, NodeLabel, NodeRef};
    use crate::ingest::folders::FolderKeys;
    use crate::ingest::unit::{ContentUnit, Hierarchy, HierarchyLevel};
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn setup() -> (Connection, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("kg.db")).unwrap();
        migrate::run_migrations(&mut conn).unwrap();
        (conn, temp_dir)
    }

    fn unit(article: &str, hierarchy: Hierarchy) -> ContentUnit {
        ContentUnit {
            document_number: Some("8/2022/NĐ-CP".to_string()),
            article_number: article.to_string(),
            title: String::new(),
            body: format!("Nội dung điều {}", article),
            hierarchy,
        }
    }

    /// Grouping 1 → Document 7 → Chương I → {Content 1 (via Mục 1), Content 2}
    fn populate(conn: &Connection) -> (ContentUnit, ContentUnit) {
        let keys = FolderKeys { grouping_id: Some(1), document_id: Some(7) };
        let chapter = Hierarchy::default().with(HierarchyLevel::Chapter, "Chương I");
        let a = unit("1", chapter.clone().with(HierarchyLevel::Section, "Mục 1"));
        let b = unit("2", chapter);

        let mut writer = GraphWriter::new(SqliteGraphStore::new(conn));
        writer.add_unit(&a, &keys).unwrap();
        writer.add_unit(&b, &keys).unwrap();
        (a, b)
    }

    #[test]
    fn test_descendants_by_depth() {
        let (conn, _temp) = setup();
        populate(&conn);
        let store = SqliteGraphStore::new(&conn);
        let grouping = store.find_node(&NodeRef::grouping(1)).unwrap().unwrap();

        assert!(descendants(&store, grouping, None, 0).unwrap().is_empty());
        assert_eq!(descendants(&store, grouping, None, 1).unwrap().len(), 1);

        // document, chapter, section, content 2, content 1
        let all = descendants(&store, grouping, None, 10).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_descendants_relation_filter() {
        let (conn, _temp) = setup();
        populate(&conn);
        let store = SqliteGraphStore::new(&conn);
        let grouping = store.find_node(&NodeRef::grouping(1)).unwrap().unwrap();

        let contains_only = descendants(&store, grouping, Some(&[RelationKind::Contains]), 10).unwrap();
        assert_eq!(contains_only.len(), 3);
        assert!(contains_only.iter().all(|e| e.relation == RelationKind::Contains));
    }

    #[test]
    fn test_descendants_unknown_node() {
        let (conn, _temp) = setup();
        let store = SqliteGraphStore::new(&conn);
        assert!(descendants(&store, 42, None, 3).unwrap().is_empty());
    }

    #[test]
    fn test_ancestor_path_of_content() {
        let (conn, _temp) = setup();
        let (a, _) = populate(&conn);
        let store = SqliteGraphStore::new(&conn);
        let content = store.find_node(&NodeRef::content(&a)).unwrap().unwrap();

        let labels: Vec<_> = ancestor_path(&store, content)
            .unwrap()
            .into_iter()
            .map(|n| n.label)
            .collect();
        assert_eq!(
            labels,
            vec![
                NodeLabel::Grouping,
                NodeLabel::Document,
                NodeLabel::Chapter,
                NodeLabel::Section,
                NodeLabel::Content,
            ]
        );
    }

    #[test]
    fn test_ancestor_path_missing_node() {
        let (conn, _temp) = setup();
        let store = SqliteGraphStore::new(&conn);
        assert!(ancestor_path(&store, 1).is_err());
    }
}
