//! Line classification
//!
//! Decides what a single report line is, given only its text and the
//! parse mode. No side effects.

use gradlegraph_core::ConfigurationKind;
use regex::Regex;
use std::sync::OnceLock;

/// Prefix of the line naming the report's project
pub const ROOT_PROJECT_TOKEN: &str = "Root project";

/// Marker contained in every configuration-section header we care about
pub const CLASSPATH_MARKER: &str = "Classpath";

/// Artifact at the current level
pub const CURRENT_LEVEL_MARKER: char = '+';

/// Last artifact at the current level
pub const LAST_LEVEL_MARKER: char = '\\';

/// Continuation of an open level above
pub const NEXT_LEVEL_MARKER: char = '|';

/// Where the parser is within a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// No root declaration seen yet
    BeforeRoot,

    /// Root seen, but no recognized configuration section is active
    AwaitingConfiguration,

    /// Inside a recognized configuration section
    ReadingTree,
}

impl ParseMode {
    /// Derive the mode from parser state
    pub fn from_state(root_seen: bool, configuration: ConfigurationKind) -> Self {
        if !configuration.is_known() {
            Self::AwaitingConfiguration
        } else if !root_seen {
            Self::BeforeRoot
        } else {
            Self::ReadingTree
        }
    }
}

/// Category of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    RootDeclaration,
    ConfigurationHeader,
    TreeLine,
    Ignore,
}

/// Classify a line
///
/// Rules are checked in order: root declaration, configuration header,
/// inactive mode, tree marker.
pub fn classify(line: &str, mode: ParseMode) -> LineKind {
    if line.starts_with(ROOT_PROJECT_TOKEN) {
        return LineKind::RootDeclaration;
    }

    if line.contains(CLASSPATH_MARKER) {
        return LineKind::ConfigurationHeader;
    }

    if mode != ParseMode::ReadingTree {
        return LineKind::Ignore;
    }

    if is_tree_line(line) {
        LineKind::TreeLine
    } else {
        LineKind::Ignore
    }
}

/// A tree line starts with a level marker, or with blank indentation units
/// that end in one (children of a last sibling).
fn is_tree_line(line: &str) -> bool {
    let starts_with_marker = |text: &str| {
        text.starts_with(CURRENT_LEVEL_MARKER)
            || text.starts_with(LAST_LEVEL_MARKER)
            || text.starts_with(NEXT_LEVEL_MARKER)
    };

    if starts_with_marker(line) {
        return true;
    }

    line.starts_with(' ') && starts_with_marker(line.trim_start_matches(' '))
}

/// Configuration kind named by a header line
///
/// The identifier is everything up to and including the classpath marker,
/// e.g. `compileClasspath - Compile classpath for source set 'main'.`
pub fn configuration_kind(line: &str) -> ConfigurationKind {
    match line.find(CLASSPATH_MARKER) {
        Some(pos) => {
            let id = line[..pos + CLASSPATH_MARKER.len()].trim();
            ConfigurationKind::from_gradle_id(id)
        }
        None => ConfigurationKind::Unknown,
    }
}

fn root_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Root project '(?P<name>[^']+)'").expect("root declaration pattern is valid")
    })
}

/// Project name from a root declaration, e.g. `Root project 'app'`
pub fn root_project_name(line: &str) -> Option<&str> {
    root_pattern()
        .captures(line)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}
