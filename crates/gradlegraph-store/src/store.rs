//! Graph store trait consumed by the graph builder

use gradlegraph_core::{Artifact, DependsOn, NewArtifact, NewDependsOn, NodeId, TypeTag};
use std::fmt;

/// How a node filter treats the group id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupMatch {
    /// Group id is not part of the filter
    #[default]
    Any,

    /// Group id must still be unknown
    Unset,

    /// Group id must equal this value
    Exact(String),
}

/// Exact-match node filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub group: GroupMatch,
    pub artifact_id: Option<String>,
    pub artifact_type: Option<TypeTag>,
}

impl NodeFilter {
    /// Filter matching every node
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group = GroupMatch::Exact(group_id.into());
        self
    }

    /// Only nodes whose group id is still unknown
    pub fn with_unset_group(mut self) -> Self {
        self.group = GroupMatch::Unset;
        self
    }

    pub fn with_artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = Some(TypeTag::new(artifact_type));
        self
    }

    /// Check a node against the filter
    pub fn matches(&self, node: &Artifact) -> bool {
        let group_ok = match &self.group {
            GroupMatch::Any => true,
            GroupMatch::Unset => node.group_id.is_none(),
            GroupMatch::Exact(group) => node.group_id.as_deref() == Some(group.as_str()),
        };

        group_ok
            && self.artifact_id.as_ref().map_or(true, |id| *id == node.artifact_id)
            && self.artifact_type.as_ref().map_or(true, |t| *t == node.artifact_type)
    }
}

/// Version filter for edges between two given nodes
///
/// Only the versions that are set take part in the match, so an edge
/// stored with both versions is found by a filter naming just one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    pub specified_version: Option<String>,
    pub resolved_version: Option<String>,
}

impl EdgeFilter {
    pub fn new(specified_version: Option<String>, resolved_version: Option<String>) -> Self {
        Self {
            specified_version,
            resolved_version,
        }
    }

    /// A filter naming no version at all cannot identify an edge
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.specified_version.is_none() && self.resolved_version.is_none() {
            return Err(StoreError::InvalidQuery(
                "edge filter needs a specified or a resolved version".to_string(),
            ));
        }
        Ok(())
    }

    /// Check an edge's versions against the filter
    pub fn matches(&self, edge: &DependsOn) -> bool {
        let specified_ok = self
            .specified_version
            .as_ref()
            .map_or(true, |v| edge.specified_version.as_ref() == Some(v));
        let resolved_ok = self
            .resolved_version
            .as_ref()
            .map_or(true, |v| edge.resolved_version.as_ref() == Some(v));

        specified_ok && resolved_ok
    }
}

/// Node and edge totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub edges: usize,
}

impl fmt::Display for GraphCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nodes, {} edges", self.nodes, self.edges)
    }
}

/// Errors that can occur in a graph store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistent or in-memory home of the artifact graph
///
/// Every mutation made between `begin_transaction` and `commit` becomes
/// visible together; `rollback` discards all of them.
pub trait GraphStore {
    /// Get the store name (e.g., "memory")
    fn name(&self) -> &'static str;

    fn begin_transaction(&mut self) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Nodes matching the filter, in creation order
    fn find_nodes(&self, filter: &NodeFilter) -> Result<Vec<Artifact>, StoreError>;

    fn create_node(&mut self, node: NewArtifact) -> Result<Artifact, StoreError>;

    /// Overwrite a stored node with the given state
    fn update_node(&mut self, node: &Artifact) -> Result<(), StoreError>;

    /// Edges from `dependant` to `dependee` matching the filter, in creation order
    fn find_edges(
        &self,
        dependant: NodeId,
        dependee: NodeId,
        filter: &EdgeFilter,
    ) -> Result<Vec<DependsOn>, StoreError>;

    fn create_edge(&mut self, edge: NewDependsOn) -> Result<DependsOn, StoreError>;

    /// Overwrite a stored edge with the given state
    fn update_edge(&mut self, edge: &DependsOn) -> Result<(), StoreError>;

    /// Remove every node and edge
    fn purge_all(&mut self) -> Result<(), StoreError>;

    fn counts(&self) -> Result<GraphCounts, StoreError>;
}
