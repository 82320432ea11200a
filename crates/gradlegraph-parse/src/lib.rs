//! Gradle dependency-report text handling
//!
//! This crate handles:
//! - Classifying report lines (root declaration, configuration header, tree line)
//! - Detecting and stripping resolution markers (`(c)`, `(*)`, `(n)`)
//! - Parsing `group:artifact[:version]` coordinates
//! - Turning fixed-width indentation into tree depth and ancestry
//!
//! Nothing here touches a graph store.

pub mod error;
pub mod line;
pub mod resolution;
pub mod version;
pub mod level;

pub use error::{ParseError, GrammarIssue};
pub use line::{LineKind, ParseMode, classify, configuration_kind, root_project_name};
pub use resolution::{ResolutionClassifier, Resolution};
pub use version::{Coordinate, parse_coordinate};
pub use level::{LevelStack, LevelError, Indented, measure, LEVEL_WIDTH};
