//! gradlegraph Core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod model;
pub mod mapping;
pub mod diagnostic;
pub mod report;
pub mod config;

pub use model::{
    Artifact, NewArtifact, NodeId, EdgeId, TypeTag, ConfigurationKind, ResolutionKind,
    DependsOn, NewDependsOn, PROJECT_GROUP_PLACEHOLDER,
};
pub use mapping::{TypeMapping, MappingEntry, MappingError};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use report::{LoadReport, ReportVersion, ReportSummary, FileOutcome, FileStatus, FileStats};
pub use config::{Config, ConfigError, ResolutionSettings};
