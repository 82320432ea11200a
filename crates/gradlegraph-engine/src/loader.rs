//! Batch loading of report files
//!
//! A path names either one report or a directory whose immediate files are
//! all reports. Files are loaded one after another, each in its own
//! transaction, and a failing file does not stop the batch.

use crate::error::LoadError;
use crate::tree::{ParseStats, TreeParser};
use gradlegraph_core::{Config, FileOutcome, LoadReport, TypeMapping};
use gradlegraph_store::GraphStore;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads reports from disk into a graph store
#[derive(Debug, Clone)]
pub struct DependencyLoader {
    parser: TreeParser,
    purge_before_load: bool,
}

impl Default for DependencyLoader {
    fn default() -> Self {
        Self::new(TreeParser::default())
    }
}

impl DependencyLoader {
    /// Create a loader that purges the store before each batch
    pub fn new(parser: TreeParser) -> Self {
        Self {
            parser,
            purge_before_load: true,
        }
    }

    /// Loader for a configuration, classifying artifacts with `mapping`
    pub fn from_config(config: &Config, mapping: TypeMapping) -> Self {
        Self::new(TreeParser::with_mapping(mapping, config.resolution))
            .with_purge(config.purge_before_load)
    }

    pub fn with_purge(mut self, purge_before_load: bool) -> Self {
        self.purge_before_load = purge_before_load;
        self
    }

    pub fn parser(&self) -> &TreeParser {
        &self.parser
    }

    /// Load a file or every file directly inside a directory
    ///
    /// Only a missing or unreadable `path` itself fails the batch; per-file
    /// failures are recorded in the report.
    pub fn load_path<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        path: &Path,
    ) -> Result<LoadReport, LoadError> {
        let files = discover(path)?;
        tracing::info!(path = %path.display(), files = files.len(), "loading dependency reports");

        if self.purge_before_load {
            store.purge_all()?;
            tracing::debug!(store = store.name(), "purged store before load");
        }

        let mut report = LoadReport::new();
        for file in &files {
            report.add_file(self.load_file(store, file));
        }

        let counts = store.counts()?;
        report.set_graph_size(counts.nodes, counts.edges);
        Ok(report)
    }

    /// Load one report file in its own transaction
    ///
    /// A file that cannot be read or is not valid UTF-8 fails without
    /// touching the store.
    pub fn load_file<S: GraphStore + ?Sized>(&self, store: &mut S, path: &Path) -> FileOutcome {
        let file_name = path.display().to_string();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => return unreadable(&file_name, None, path, source),
        };

        let sha256 = hex::encode(Sha256::digest(&bytes));
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                let source = std::io::Error::new(std::io::ErrorKind::InvalidData, err.utf8_error());
                return unreadable(&file_name, Some(sha256), path, source);
            }
        };

        match self.parser.parse_lines(store, &file_name, text.lines()) {
            Ok(stats) => {
                tracing::info!(file = %file_name, tree_lines = stats.tree_lines, "completed");
                FileOutcome::loaded(file_name, Some(sha256), stats)
            }
            Err(failure) => {
                tracing::warn!(file = %file_name, error = %failure, "rolled back");
                let diagnostic = failure.to_diagnostic(&file_name);
                FileOutcome::failed(file_name, Some(sha256), failure.stats, diagnostic)
            }
        }
    }
}

/// Failed outcome for a file whose content never reached the parser
fn unreadable(file_name: &str, sha256: Option<String>, path: &Path, source: std::io::Error) -> FileOutcome {
    let error = LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    tracing::warn!(file = %file_name, error = %error, "failed to read report");
    FileOutcome::failed(file_name, sha256, ParseStats::default(), error.to_diagnostic(file_name))
}

/// Files to load for `path`, sorted by name
fn discover(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let metadata = std::fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| LoadError::Io {
            path: path.to_path_buf(),
            source: err.into(),
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
