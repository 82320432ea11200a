//! Find-or-create and merge semantics for the artifact graph
//!
//! Every operation looks the target up before creating it, so feeding the
//! same report twice leaves node and edge counts unchanged. Edges carry
//! union-only sets that grow with every observation.

use gradlegraph_core::{
    Artifact, ConfigurationKind, DependsOn, NewArtifact, NewDependsOn, NodeId, ResolutionKind,
    TypeMapping, TypeTag,
};
use gradlegraph_store::{EdgeFilter, GraphStore, NodeFilter, StoreError};

/// Context in which an edge was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<'a> {
    pub configuration: ConfigurationKind,
    pub resolution: ResolutionKind,

    /// Project whose report contained the edge
    pub source: &'a str,
}

/// Upserts artifacts and depends-on edges against a store
#[derive(Debug, Clone, Default)]
pub struct GraphModelBuilder {
    mapping: TypeMapping,
}

impl GraphModelBuilder {
    /// Create a builder that classifies new artifacts with `mapping`
    pub fn new(mapping: TypeMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    /// Find or create the artifact `group_id:artifact_id`
    ///
    /// Lookup order:
    /// 1. Exact `(group_id, artifact_id)` match
    /// 2. A project node with that artifact id whose group is still unknown;
    ///    its group is back-filled
    /// 3. A new node typed by the mapping table
    pub fn resolve_artifact<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Artifact, StoreError> {
        let exact = NodeFilter::new().with_group(group_id).with_artifact_id(artifact_id);
        if let Some(node) = store.find_nodes(&exact)?.into_iter().next() {
            return Ok(node);
        }

        let pending_project = NodeFilter::new()
            .with_unset_group()
            .with_artifact_id(artifact_id)
            .with_type(TypeTag::PROJECT);
        if let Some(mut project) = store.find_nodes(&pending_project)?.into_iter().next() {
            project.group_id = Some(group_id.to_string());
            store.update_node(&project)?;
            tracing::debug!(node = %project, "back-filled project group");
            return Ok(project);
        }

        let artifact_type = self.mapping.classify(group_id);
        let node = store.create_node(NewArtifact::new(Some(group_id.to_string()), artifact_id, artifact_type))?;
        tracing::debug!(node = %node, "created artifact");
        Ok(node)
    }

    /// Find, promote or create the node for a report's root project
    ///
    /// A node already typed `PROJECT` with this name is reused. Otherwise the
    /// first `INTERNAL`-labelled node with this artifact id is promoted in
    /// place. Nodes with any other label are left alone and a fresh project
    /// node is created next to them.
    pub fn promote_or_create_project<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        project_name: &str,
    ) -> Result<Artifact, StoreError> {
        let candidates = store.find_nodes(&NodeFilter::new().with_artifact_id(project_name))?;

        if let Some(project) = candidates.iter().find(|node| node.artifact_type.is_project()) {
            return Ok(project.clone());
        }

        if let Some(mut internal) = candidates.into_iter().find(|node| node.has_label(TypeTag::INTERNAL)) {
            internal.labels.remove(&TypeTag::internal());
            internal.labels.insert(TypeTag::project());
            internal.artifact_type = TypeTag::project();
            store.update_node(&internal)?;
            tracing::debug!(node = %internal, "promoted internal artifact to project");
            return Ok(internal);
        }

        let project = store.create_node(NewArtifact::new(None, project_name, TypeTag::project()))?;
        tracing::debug!(node = %project, "created project");
        Ok(project)
    }

    /// Find or create the edge `dependant -> dependee` and record the observation
    ///
    /// Existing edges are matched on whichever versions are given, so an edge
    /// stored with both versions is reused by an observation naming one.
    pub fn resolve_edge<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        dependant: NodeId,
        dependee: NodeId,
        specified_version: Option<&str>,
        resolved_version: Option<&str>,
        observation: &Observation<'_>,
    ) -> Result<DependsOn, StoreError> {
        let filter = EdgeFilter::new(
            specified_version.map(str::to_string),
            resolved_version.map(str::to_string),
        );

        let mut edge = match store.find_edges(dependant, dependee, &filter)?.into_iter().next() {
            Some(edge) => edge,
            None => {
                let created = store.create_edge(NewDependsOn::new(
                    dependant,
                    dependee,
                    filter.specified_version,
                    filter.resolved_version,
                ))?;
                tracing::trace!(edge = %created.id, name = %created.name, "created edge");
                created
            }
        };

        edge.add_configuration(observation.configuration);
        edge.add_resolution_kind(observation.resolution);
        edge.add_source(observation.source);
        store.update_edge(&edge)?;

        Ok(edge)
    }
}
