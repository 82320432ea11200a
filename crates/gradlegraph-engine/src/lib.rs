//! gradlegraph engine - report loading
//!
//! This crate turns Gradle dependency reports into graph mutations:
//! - Find-or-create and merge semantics for artifacts and edges
//! - Per-file line folding inside one store transaction
//! - Batch loading of a file or a directory of reports

pub mod error;
pub mod builder;
pub mod tree;
pub mod loader;

pub use error::{LoadError, LineOutcome, SkipReason, ParseFailure};
pub use builder::{GraphModelBuilder, Observation};
pub use tree::{TreeParser, FileContext, ParseStats};
pub use loader::DependencyLoader;
