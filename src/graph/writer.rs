use serde::Serialize;

use super::{GraphStore, NodeId, NodeRef, RelationKind};
use crate::error::Result;
use crate::ingest::folders::FolderKeys;
use crate::ingest::unit::ContentUnit;

/// What one or more `add_unit` calls created. Reused nodes and edges are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub nodes_created: usize,
    pub edges_created: usize,
}

impl std::ops::AddAssign for WriteSummary {
    fn add_assign(&mut self, other: Self) {
        self.nodes_created += other.nodes_created;
        self.edges_created += other.edges_created;
    }
}

/// Writes content units into the graph with create-if-absent semantics.
///
/// Calling [`GraphWriter::add_unit`] again with the same unit and folder keys
/// leaves the graph unchanged. Store errors are returned as is and never
/// retried here.
pub struct GraphWriter<S: GraphStore> {
    store: S,
}

impl<S: GraphStore> GraphWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Merge one unit and its containment chain.
    ///
    /// `Grouping → Document → first present level → … → deepest level`, then
    /// `deepest level ─TERMINALLY_CONTAINS→ Content`. Without any hierarchy
    /// level the document links straight to the content node.
    pub fn add_unit(&mut self, unit: &ContentUnit, keys: &FolderKeys) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        let document_number = unit.document_number.as_deref();

        let grouping = match keys.grouping_id {
            Some(id) => Some(self.merge_node(&NodeRef::grouping(id), &mut summary)?),
            None => None,
        };

        let document = match keys.document_id {
            Some(id) => Some(self.merge_node(&NodeRef::document(id, document_number), &mut summary)?),
            None => None,
        };

        if let (Some(grouping), Some(document)) = (grouping, document) {
            self.merge_edge(grouping, RelationKind::Contains, document, &mut summary)?;
        }

        let content = self.merge_node(&NodeRef::content(unit), &mut summary)?;

        let mut entry: Option<NodeId> = None;
        let mut deepest: Option<NodeId> = None;
        for (level, name) in unit.hierarchy.levels() {
            let node = self.merge_node(&NodeRef::level(level, name, document_number), &mut summary)?;
            if let Some(outer) = deepest {
                self.merge_edge(outer, RelationKind::Contains, node, &mut summary)?;
            }
            entry.get_or_insert(node);
            deepest = Some(node);
        }

        if let Some(document) = document {
            self.merge_edge(document, RelationKind::Contains, entry.unwrap_or(content), &mut summary)?;
        }

        if let Some(deepest) = deepest {
            self.merge_edge(deepest, RelationKind::TerminallyContains, content, &mut summary)?;
        }

        Ok(summary)
    }

    fn merge_node(&mut self, node: &NodeRef, summary: &mut WriteSummary) -> Result<NodeId> {
        let merged = self.store.merge_node(node)?;
        if merged.created {
            summary.nodes_created += 1;
            log::info!("Created node {} (id {})", node, merged.id);
        } else {
            log::debug!("Node {} already exists (id {})", node, merged.id);
        }
        Ok(merged.id)
    }

    fn merge_edge(
        &mut self,
        source: NodeId,
        relation: RelationKind,
        target: NodeId,
        summary: &mut WriteSummary,
    ) -> Result<()> {
        if self.store.merge_edge(source, relation, target)? {
            summary.edges_created += 1;
            log::info!("Created edge {} -[{}]-> {}", source, relation, target);
        } else {
            log::debug!("Edge {} -[{}]-> {} already exists", source, relation, target);
        }
        Ok(())
    }
}
