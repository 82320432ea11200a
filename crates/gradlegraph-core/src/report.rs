//! Load report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::Diagnostic;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Line counters for one parsed file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Lines read
    pub lines: usize,

    /// Tree lines that produced a node/edge upsert
    pub tree_lines: usize,

    /// Tree lines dropped without mutation (unknown configuration, before root, disabled resolution)
    pub skipped_lines: usize,

    /// Root declarations seen
    pub roots: usize,
}

impl FileStats {
    /// Add another file's counters to this one
    pub fn accumulate(&mut self, other: &FileStats) {
        self.lines += other.lines;
        self.tree_lines += other.tree_lines;
        self.skipped_lines += other.skipped_lines;
        self.roots += other.roots;
    }
}

/// Whether a file's transaction was committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Committed
    Loaded,

    /// Rolled back
    Failed,
}

/// Outcome of loading one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Input path
    pub path: String,

    pub status: FileStatus,

    /// SHA-256 of the file contents (hex), absent if it could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Counters up to completion or failure
    pub stats: FileStats,

    /// Fatal error that rolled the file back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl FileOutcome {
    /// Outcome of a committed file
    pub fn loaded(path: impl Into<String>, sha256: Option<String>, stats: FileStats) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Loaded,
            sha256,
            stats,
            diagnostic: None,
        }
    }

    /// Outcome of a rolled-back file
    pub fn failed(path: impl Into<String>, sha256: Option<String>, stats: FileStats, diagnostic: Diagnostic) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Failed,
            sha256,
            stats,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FileStatus::Loaded
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of input files
    pub files_total: usize,

    /// Files committed
    pub files_loaded: usize,

    /// Files rolled back
    pub files_failed: usize,

    /// Tree lines applied across committed files
    pub tree_lines: usize,

    /// Lines skipped across committed files
    pub skipped_lines: usize,

    /// Nodes in the store after the batch
    pub nodes: usize,

    /// Edges in the store after the batch
    pub edges: usize,
}

/// Load report (report.json v1)
///
/// This is the stable output format.
/// All fields are versioned and backward-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-file outcomes, in processing order
    pub files: Vec<FileOutcome>,
}

impl LoadReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            files: Vec::new(),
        }
    }

    /// Record a file outcome
    pub fn add_file(&mut self, outcome: FileOutcome) {
        self.summary.files_total += 1;

        if outcome.is_loaded() {
            self.summary.files_loaded += 1;
            self.summary.tree_lines += outcome.stats.tree_lines;
            self.summary.skipped_lines += outcome.stats.skipped_lines;
        } else {
            self.summary.files_failed += 1;
        }

        self.files.push(outcome);
    }

    /// Record the store size after the batch
    pub fn set_graph_size(&mut self, nodes: usize, edges: usize) {
        self.summary.nodes = nodes;
        self.summary.edges = edges;
    }

    /// Check if any file was rolled back
    pub fn has_failures(&self) -> bool {
        self.summary.files_failed > 0
    }

    /// Diagnostics of failed files
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().filter_map(|f| f.diagnostic.as_ref())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for LoadReport {
    fn default() -> Self {
        Self::new()
    }
}
