//! Graph schema: artifact nodes and depends-on edges
//!
//! These structs are the explicit mapping between the parser and a graph
//! store. Stores translate them to their own create/update calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Display value for a group id that has not been discovered yet
pub const PROJECT_GROUP_PLACEHOLDER: &str = "PROJECT";

/// Store-assigned node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Store-assigned edge identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Artifact type tag, also used as a node label
///
/// The vocabulary is open: any tag named by the type-mapping table is
/// valid. `EXTERNAL`, `INTERNAL` and `PROJECT` are reserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    /// Default tag for anything the mapping table does not claim
    pub const EXTERNAL: &'static str = "EXTERNAL";

    /// Artifacts built by the organisation itself
    pub const INTERNAL: &'static str = "INTERNAL";

    /// The root project of a dependency report
    pub const PROJECT: &'static str = "PROJECT";

    /// Create a tag from any string
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn external() -> Self {
        Self::new(Self::EXTERNAL)
    }

    pub fn internal() -> Self {
        Self::new(Self::INTERNAL)
    }

    pub fn project() -> Self {
        Self::new(Self::PROJECT)
    }

    /// Get the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_project(&self) -> bool {
        self.0 == Self::PROJECT
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Payload for creating an artifact node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtifact {
    /// Group id, `None` while still unknown
    pub group_id: Option<String>,

    /// Artifact id
    pub artifact_id: String,

    /// Type tag
    pub artifact_type: TypeTag,

    /// Labels attached to the node
    pub labels: BTreeSet<TypeTag>,
}

impl NewArtifact {
    /// Create a payload whose label set contains exactly its type tag
    pub fn new(group_id: Option<String>, artifact_id: impl Into<String>, artifact_type: TypeTag) -> Self {
        let mut labels = BTreeSet::new();
        labels.insert(artifact_type.clone());

        Self {
            group_id,
            artifact_id: artifact_id.into(),
            artifact_type,
            labels,
        }
    }
}

/// Artifact node as stored in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Store identity
    pub id: NodeId,

    /// Group id, `None` while still unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Artifact id
    pub artifact_id: String,

    /// Display name, always the artifact id
    pub name: String,

    /// Type tag
    pub artifact_type: TypeTag,

    /// Labels, initially `{artifact_type}`
    pub labels: BTreeSet<TypeTag>,
}

impl Artifact {
    /// Materialize a creation payload under a store-assigned id
    pub fn from_new(id: NodeId, new: NewArtifact) -> Self {
        Self {
            id,
            group_id: new.group_id,
            name: new.artifact_id.clone(),
            artifact_id: new.artifact_id,
            artifact_type: new.artifact_type,
            labels: new.labels,
        }
    }

    /// Group id, or the placeholder while it is unknown
    pub fn group_display(&self) -> &str {
        self.group_id.as_deref().unwrap_or(PROJECT_GROUP_PLACEHOLDER)
    }

    /// `group:artifact` coordinate
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_display(), self.artifact_id)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.as_str() == label)
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.coordinate(), self.artifact_type)
    }
}

/// Gradle configuration under which a dependency tree was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationKind {
    /// `compileClasspath`
    Compile,

    /// `runtimeClasspath`
    Runtime,

    /// `testCompileClasspath`
    TestCompile,

    /// `testRuntimeClasspath`
    TestRuntime,

    /// Anything else; trees under it are ignored
    Unknown,
}

impl ConfigurationKind {
    /// All recognized kinds, `Unknown` last
    pub const ALL: [ConfigurationKind; 5] = [
        Self::Compile,
        Self::Runtime,
        Self::TestCompile,
        Self::TestRuntime,
        Self::Unknown,
    ];

    /// Identifier used by Gradle in the configuration header
    pub fn gradle_id(&self) -> &'static str {
        match self {
            Self::Compile => "compileClasspath",
            Self::Runtime => "runtimeClasspath",
            Self::TestCompile => "testCompileClasspath",
            Self::TestRuntime => "testRuntimeClasspath",
            Self::Unknown => "unknown",
        }
    }

    /// Look up a kind by its exact Gradle identifier
    pub fn from_gradle_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| *kind != Self::Unknown && kind.gradle_id() == id)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl std::fmt::Display for ConfigurationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.gradle_id())
    }
}

/// How Gradle resolved a dependency line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionKind {
    /// No marker
    Normal,

    /// `(c)` - dependency constraint
    Constrained,

    /// `(*)` - subtree already listed earlier
    Omitted,

    /// `(n)` - not resolved
    NotResolved,
}

impl ResolutionKind {
    /// Marked kinds in the order the classifier tries them
    pub const MARKED: [ResolutionKind; 3] = [Self::Constrained, Self::Omitted, Self::NotResolved];

    /// Trailing marker text, `None` for `Normal`
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Constrained => Some("(c)"),
            Self::Omitted => Some("(*)"),
            Self::NotResolved => Some("(n)"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Constrained => "CONSTRAINED",
            Self::Omitted => "OMITTED",
            Self::NotResolved => "NOT_RESOLVED",
        }
    }
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for creating a depends-on edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDependsOn {
    /// Artifact that requires the dependency (edge start)
    pub dependant: NodeId,

    /// Artifact being depended on (edge end)
    pub dependee: NodeId,

    pub specified_version: Option<String>,

    pub resolved_version: Option<String>,
}

impl NewDependsOn {
    pub fn new(
        dependant: NodeId,
        dependee: NodeId,
        specified_version: Option<String>,
        resolved_version: Option<String>,
    ) -> Self {
        Self {
            dependant,
            dependee,
            specified_version,
            resolved_version,
        }
    }
}

/// Depends-on edge as stored in the graph
///
/// The three sets only ever grow: every observation of the same edge
/// unions its configuration, resolution kind and source project into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    /// Store identity
    pub id: EdgeId,

    pub dependant: NodeId,

    pub dependee: NodeId,

    /// Derived display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specified_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,

    #[serde(default)]
    pub configurations: BTreeSet<ConfigurationKind>,

    #[serde(default)]
    pub resolution_kinds: BTreeSet<ResolutionKind>,

    /// Projects whose reports contained this edge
    #[serde(default)]
    pub sources: BTreeSet<String>,
}

impl DependsOn {
    /// Materialize a creation payload under a store-assigned id, with empty sets
    pub fn from_new(id: EdgeId, new: NewDependsOn) -> Self {
        let name = Self::display_name(new.specified_version.as_deref(), new.resolved_version.as_deref());

        Self {
            id,
            dependant: new.dependant,
            dependee: new.dependee,
            name,
            specified_version: new.specified_version,
            resolved_version: new.resolved_version,
            configurations: BTreeSet::new(),
            resolution_kinds: BTreeSet::new(),
            sources: BTreeSet::new(),
        }
    }

    /// Display name derived from the versions present
    pub fn display_name(specified: Option<&str>, resolved: Option<&str>) -> String {
        match (specified, resolved) {
            (Some(s), None) => s.to_string(),
            (None, Some(r)) => format!("-> {}", r),
            (Some(s), Some(r)) => format!("{} -> {}", s, r),
            (None, None) => String::new(),
        }
    }

    pub fn add_configuration(&mut self, configuration: ConfigurationKind) {
        self.configurations.insert(configuration);
    }

    pub fn add_resolution_kind(&mut self, kind: ResolutionKind) {
        self.resolution_kinds.insert(kind);
    }

    pub fn add_source(&mut self, source: impl Into<String>) {
        self.sources.insert(source.into());
    }
}
