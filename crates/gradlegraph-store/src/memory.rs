//! In-memory graph store
//!
//! Keeps nodes and edges in ordered maps keyed by id, so lookups return
//! results in creation order. Transactions copy the graph on begin and
//! restore the copy on rollback.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gradlegraph_store::{GraphStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.begin_transaction()?;
//! let app = store.create_node(NewArtifact::new(None, "app", TypeTag::project()))?;
//! store.commit()?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // The third write fails with StoreError::Backend
//! let store = MemoryStore::new().with_write_limit(2);
//!
//! // The next commit fails and leaves the transaction open
//! let store = MemoryStore::new().with_failing_commit();
//! ```

use crate::snapshot::GraphSnapshot;
use crate::store::{EdgeFilter, GraphCounts, GraphStore, NodeFilter, StoreError};
use gradlegraph_core::{Artifact, DependsOn, EdgeId, NewArtifact, NewDependsOn, NodeId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Graph {
    nodes: BTreeMap<NodeId, Artifact>,
    edges: BTreeMap<EdgeId, DependsOn>,
    next_node: u64,
    next_edge: u64,
}

/// In-memory transactional graph store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    graph: Graph,

    /// Graph as it was when the open transaction began
    checkpoint: Option<Graph>,

    /// Writes allowed before every further write fails
    write_limit: Option<usize>,

    /// Writes performed so far
    writes: usize,

    /// Refuse the next commit
    fail_next_commit: bool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write after the first `limit` ones
    ///
    /// Useful for exercising rollback paths.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Make the next commit fail with `StoreError::Backend`
    ///
    /// The transaction stays open, as with a backend that refused it.
    pub fn with_failing_commit(mut self) -> Self {
        self.fail_next_commit = true;
        self
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, StoreError> {
        let mut graph = Graph::default();

        for node in snapshot.nodes {
            graph.next_node = graph.next_node.max(node.id.0 + 1);
            if graph.nodes.insert(node.id, node).is_some() {
                return Err(StoreError::Serialization("duplicate node id in snapshot".to_string()));
            }
        }

        for edge in snapshot.edges {
            for end in [edge.dependant, edge.dependee] {
                if !graph.nodes.contains_key(&end) {
                    return Err(StoreError::Serialization(format!(
                        "edge {} references missing node {}",
                        edge.id, end
                    )));
                }
            }
            graph.next_edge = graph.next_edge.max(edge.id.0 + 1);
            if graph.edges.insert(edge.id, edge).is_some() {
                return Err(StoreError::Serialization("duplicate edge id in snapshot".to_string()));
            }
        }

        Ok(Self {
            graph,
            ..Self::default()
        })
    }

    /// Copy of the current graph
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.nodes.values().cloned().collect(),
            edges: self.graph.edges.values().cloned().collect(),
        }
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Artifact> {
        self.graph.nodes.values()
    }

    /// All edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &DependsOn> {
        self.graph.edges.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Artifact> {
        self.graph.nodes.get(&id)
    }

    pub fn in_transaction(&self) -> bool {
        self.checkpoint.is_some()
    }

    fn record_write(&mut self, operation: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.write_limit {
            if self.writes >= limit {
                return Err(StoreError::Backend(format!(
                    "simulated failure on {} (write limit {} reached)",
                    operation, limit
                )));
            }
        }
        self.writes += 1;
        Ok(())
    }
}

impl GraphStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_some() {
            return Err(StoreError::Transaction("transaction already open".to_string()));
        }
        self.checkpoint = Some(self.graph.clone());
        tracing::trace!("transaction opened");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_next_commit && self.checkpoint.is_some() {
            self.fail_next_commit = false;
            return Err(StoreError::Backend("simulated commit failure".to_string()));
        }
        self.checkpoint
            .take()
            .ok_or_else(|| StoreError::Transaction("commit without open transaction".to_string()))?;
        tracing::trace!(nodes = self.graph.nodes.len(), edges = self.graph.edges.len(), "transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let checkpoint = self
            .checkpoint
            .take()
            .ok_or_else(|| StoreError::Transaction("rollback without open transaction".to_string()))?;
        self.graph = checkpoint;
        tracing::trace!("transaction rolled back");
        Ok(())
    }

    fn find_nodes(&self, filter: &NodeFilter) -> Result<Vec<Artifact>, StoreError> {
        Ok(self
            .graph
            .nodes
            .values()
            .filter(|node| filter.matches(node))
            .cloned()
            .collect())
    }

    fn create_node(&mut self, node: NewArtifact) -> Result<Artifact, StoreError> {
        self.record_write("create_node")?;

        let id = NodeId(self.graph.next_node);
        self.graph.next_node += 1;

        let artifact = Artifact::from_new(id, node);
        self.graph.nodes.insert(id, artifact.clone());
        Ok(artifact)
    }

    fn update_node(&mut self, node: &Artifact) -> Result<(), StoreError> {
        self.record_write("update_node")?;

        let stored = self
            .graph
            .nodes
            .get_mut(&node.id)
            .ok_or_else(|| StoreError::NotFound(format!("node {}", node.id)))?;
        *stored = node.clone();
        Ok(())
    }

    fn find_edges(
        &self,
        dependant: NodeId,
        dependee: NodeId,
        filter: &EdgeFilter,
    ) -> Result<Vec<DependsOn>, StoreError> {
        filter.validate()?;

        Ok(self
            .graph
            .edges
            .values()
            .filter(|edge| edge.dependant == dependant && edge.dependee == dependee)
            .filter(|edge| filter.matches(edge))
            .cloned()
            .collect())
    }

    fn create_edge(&mut self, edge: NewDependsOn) -> Result<DependsOn, StoreError> {
        for end in [edge.dependant, edge.dependee] {
            if !self.graph.nodes.contains_key(&end) {
                return Err(StoreError::NotFound(format!("node {}", end)));
            }
        }

        self.record_write("create_edge")?;

        let id = EdgeId(self.graph.next_edge);
        self.graph.next_edge += 1;

        let depends_on = DependsOn::from_new(id, edge);
        self.graph.edges.insert(id, depends_on.clone());
        Ok(depends_on)
    }

    fn update_edge(&mut self, edge: &DependsOn) -> Result<(), StoreError> {
        self.record_write("update_edge")?;

        let stored = self
            .graph
            .edges
            .get_mut(&edge.id)
            .ok_or_else(|| StoreError::NotFound(format!("edge {}", edge.id)))?;
        *stored = edge.clone();
        Ok(())
    }

    fn purge_all(&mut self) -> Result<(), StoreError> {
        self.record_write("purge_all")?;
        self.graph = Graph::default();
        tracing::debug!("store purged");
        Ok(())
    }

    fn counts(&self) -> Result<GraphCounts, StoreError> {
        Ok(GraphCounts {
            nodes: self.graph.nodes.len(),
            edges: self.graph.edges.len(),
        })
    }
}
