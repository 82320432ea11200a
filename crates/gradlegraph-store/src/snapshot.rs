//! JSON persistence for a whole graph

use crate::store::StoreError;
use gradlegraph_core::{Artifact, DependsOn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every node and edge of a graph, in id order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Artifact>,
    pub edges: Vec<DependsOn>,
}

impl GraphSnapshot {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write the snapshot to a file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Read a snapshot written by `save_to_file`
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Node whose display coordinate is `group:artifact`
    pub fn find_node(&self, coordinate: &str) -> Option<&Artifact> {
        self.nodes.iter().find(|node| node.coordinate() == coordinate)
    }
}
