//! Group-id prefix to artifact type mapping
//!
//! The table is ordered and the first matching prefix wins. It is built
//! once and handed to the graph builder; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::model::TypeTag;

/// One `prefix=TYPE` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Group-id prefix
    pub prefix: String,

    /// Type assigned to matching artifacts
    #[serde(rename = "type")]
    pub artifact_type: TypeTag,
}

impl MappingEntry {
    pub fn new(prefix: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            artifact_type: TypeTag::new(artifact_type),
        }
    }
}

/// Ordered prefix-mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    entries: Vec<MappingEntry>,
}

impl TypeMapping {
    /// Create a mapping from entries, keeping their order
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    /// Built-in mapping used when nothing else is configured
    pub fn builtin() -> Self {
        Self::new(vec![
            MappingEntry::new("com.mrll", TypeTag::INTERNAL),
            MappingEntry::new("com.datasite", TypeTag::INTERNAL),
            MappingEntry::new("org.springframework", "SPRING"),
            MappingEntry::new("io.pivotal", "SPRING"),
            MappingEntry::new("org.apache", "APACHE"),
        ])
    }

    /// Parse the properties format: one `prefix=TYPE` per line
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn parse(text: &str) -> Result<Self, MappingError> {
        let mut entries = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = || MappingError::InvalidLine {
                line: index + 1,
                text: raw.to_string(),
            };

            let (prefix, tag) = line.split_once('=').ok_or_else(invalid)?;
            let (prefix, tag) = (prefix.trim(), tag.trim());
            if prefix.is_empty() || tag.is_empty() {
                return Err(invalid());
            }

            entries.push(MappingEntry::new(prefix, tag));
        }

        Ok(Self::new(entries))
    }

    /// Load a mapping file in the properties format
    pub fn from_file(path: &Path) -> Result<Self, MappingError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MappingError::IoError(path.display().to_string(), e.to_string()))?;

        Self::parse(&contents)
    }

    /// Type for a group id: first matching prefix, else `EXTERNAL`
    pub fn classify(&self, group_id: &str) -> TypeTag {
        self.entries
            .iter()
            .find(|entry| group_id.starts_with(entry.prefix.as_str()))
            .map(|entry| entry.artifact_type.clone())
            .unwrap_or_else(TypeTag::external)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Mapping error types
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Failed to read mapping file {0}: {1}")]
    IoError(String, String),

    #[error("Invalid mapping at line {line}: {text:?} (expected prefix=TYPE)")]
    InvalidLine { line: usize, text: String },
}

impl MappingError {
    /// Warning diagnostic; an unusable mapping file never aborts a load
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::MappingError, Severity::Warn, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_classification() {
        let mapping = TypeMapping::builtin();

        assert_eq!(mapping.classify("com.mrll.platform").as_str(), "INTERNAL");
        assert_eq!(mapping.classify("org.springframework.boot").as_str(), "SPRING");
        assert_eq!(mapping.classify("io.pivotal.cfenv").as_str(), "SPRING");
        assert_eq!(mapping.classify("org.apache.commons").as_str(), "APACHE");
        assert_eq!(mapping.classify("com.google.guava").as_str(), "EXTERNAL");
    }

    #[test]
    fn first_match_wins() {
        let mapping = TypeMapping::new(vec![
            MappingEntry::new("org", "ORG"),
            MappingEntry::new("org.apache", "APACHE"),
        ]);

        assert_eq!(mapping.classify("org.apache.kafka").as_str(), "ORG");
    }

    #[test]
    fn parse_properties() {
        let text = "# internal code\n\ncom.acme = INTERNAL\norg.slf4j=LOGGING\n";
        let mapping = TypeMapping::parse(text).unwrap();

        assert_eq!(
            mapping.entries(),
            &[
                MappingEntry::new("com.acme", "INTERNAL"),
                MappingEntry::new("org.slf4j", "LOGGING"),
            ]
        );
    }

    #[test]
    fn parse_rejects_line_without_separator() {
        let err = TypeMapping::parse("com.acme=INTERNAL\nbogus\n").unwrap_err();
        assert!(matches!(err, MappingError::InvalidLine { line: 2, .. }));

        let diag = err.to_diagnostic();
        assert_eq!(diag.code, DiagnosticCode::MappingError);
        assert_eq!(diag.severity, Severity::Warn);
    }

    #[test]
    fn parse_comment_only_is_empty() {
        let mapping = TypeMapping::parse("# nothing here\n").unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn from_file_reads_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.properties");
        std::fs::write(&path, "io.micronaut=MICRONAUT\n").unwrap();

        let mapping = TypeMapping::from_file(&path).unwrap();
        assert_eq!(mapping.classify("io.micronaut.http").as_str(), "MICRONAUT");
    }
}
