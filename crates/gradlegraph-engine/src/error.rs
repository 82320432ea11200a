//! Load errors and per-line outcomes

use gradlegraph_core::{
    ConfigurationKind, Diagnostic, DiagnosticCode, FileStats, Location, ResolutionKind, Severity,
};
use gradlegraph_parse::ParseError;
use gradlegraph_store::StoreError;
use std::path::PathBuf;

/// Why a line produced no mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not part of any dependency tree (blank, banner, legend)
    Ignored,

    /// Tree line under a configuration we do not track
    UnknownConfiguration,

    /// Tree line before the file's root declaration
    BeforeRoot,

    /// Tree line carrying a marker whose kind is disabled
    DisabledResolution(ResolutionKind),
}

/// Result of processing one line that did not abort the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Artifact and edge upserted at this depth
    Applied { depth: usize },

    Skipped(SkipReason),

    /// Root project promoted or created; ancestry restarted
    RootDeclared,

    ConfigurationSelected(ConfigurationKind),
}

/// Fatal error while loading reports
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Parse(err) => err.code(),
            Self::Store(_) => DiagnosticCode::StoreError,
            Self::Io { .. } => DiagnosticCode::IoError,
        }
    }

    /// Convert to a diagnostic located in `file`
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        match self {
            Self::Parse(err) => err.to_diagnostic(file),
            _ => Diagnostic::new(self.code(), Severity::Error, self.to_string())
                .with_location(Location::new(file)),
        }
    }
}

/// A file that was rolled back, with the counters reached before the failure
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ParseFailure {
    pub stats: FileStats,

    /// Line being processed when the error occurred, if any
    pub line: Option<usize>,

    #[source]
    pub error: LoadError,
}

impl ParseFailure {
    pub fn new(stats: FileStats, line: Option<usize>, error: LoadError) -> Self {
        Self { stats, line, error }
    }

    /// Diagnostic for the failure; store errors get the failing line attached
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let diag = self.error.to_diagnostic(file);

        match (&self.error, self.line) {
            (LoadError::Store(_), Some(line)) => diag.with_location(Location::with_line(file, line)),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradlegraph_parse::GrammarIssue;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_errors_keep_their_code() {
        let err = LoadError::from(ParseError::Grammar {
            line: 4,
            text: "+--- a".into(),
            issue: GrammarIssue::FieldCount { found: 1 },
        });

        let diag = err.to_diagnostic("app.txt");
        assert_eq!(diag.code, DiagnosticCode::GrammarError);
        assert_eq!(diag.location, Some(Location::with_line("app.txt", 4)));
    }

    #[test]
    fn store_failure_points_at_line() {
        let failure = ParseFailure::new(
            FileStats::default(),
            Some(7),
            LoadError::from(StoreError::Backend("disk full".into())),
        );

        let diag = failure.to_diagnostic("app.txt");
        assert_eq!(diag.code, DiagnosticCode::StoreError);
        assert_eq!(diag.location, Some(Location::with_line("app.txt", 7)));
        assert!(diag.message.contains("disk full"));
    }

    #[test]
    fn io_error_message_names_path() {
        let err = LoadError::Io {
            path: PathBuf::from("reports/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(err.code(), DiagnosticCode::IoError);
        assert!(err.to_string().contains("reports/missing.txt"));
    }
}
