//! Indentation depth and ancestry tracking
//!
//! Gradle draws every tree level as a fixed-width unit: either a marker
//! followed by dashes (`+--- `, `\--- `) or a continuation (`|    `, five
//! spaces). The depth of a line is the number of units before its marker.

use crate::line::{CURRENT_LEVEL_MARKER, LAST_LEVEL_MARKER};

/// Width of one indentation unit
pub const LEVEL_WIDTH: usize = 5;

/// Depth and coordinate text of a tree line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indented<'a> {
    /// 1 for direct dependencies of the root project
    pub depth: usize,

    /// Text after the marker unit
    pub coordinate: &'a str,
}

fn at_marker(text: &str) -> bool {
    text.starts_with(CURRENT_LEVEL_MARKER) || text.starts_with(LAST_LEVEL_MARKER)
}

/// Measure the depth of a tree line
///
/// Returns `None` when stripping units never reaches a marker, or the
/// marker unit is truncated.
pub fn measure(line: &str) -> Option<Indented<'_>> {
    let mut rest = line;
    let mut depth = 1;

    while !at_marker(rest) {
        rest = rest.get(LEVEL_WIDTH..)?;
        depth += 1;
    }

    let coordinate = rest.get(LEVEL_WIDTH..)?;
    Some(Indented { depth, coordinate })
}

/// Stack reconciliation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("no root on the ancestry stack")]
    EmptyStack,

    #[error("depth {depth} is deeper than the {open} open level(s) allow")]
    DepthSkipped { depth: usize, open: usize },
}

/// Ancestry path from the tree root to the most recent artifact
///
/// The bottom entry is the root project (depth 0); the entry at index `d`
/// is the latest artifact seen at depth `d`.
#[derive(Debug, Clone)]
pub struct LevelStack<T> {
    entries: Vec<T>,
}

impl<T> Default for LevelStack<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> LevelStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tree rooted at `root`, discarding any previous path
    pub fn reset(&mut self, root: T) {
        self.entries.clear();
        self.entries.push(root);
    }

    /// Pop until the stack holds exactly `depth` entries and return the
    /// new top, the dependant for an artifact at `depth`.
    ///
    /// Pops both when ascending after a leaf and when a sibling follows a
    /// childless sibling at the same depth.
    pub fn reconcile(&mut self, depth: usize) -> Result<&T, LevelError> {
        if self.entries.is_empty() {
            return Err(LevelError::EmptyStack);
        }

        if depth == 0 || depth > self.entries.len() {
            return Err(LevelError::DepthSkipped {
                depth,
                open: self.entries.len(),
            });
        }

        self.entries.truncate(depth);
        self.entries.last().ok_or(LevelError::EmptyStack)
    }

    /// Push the artifact just resolved; it becomes the candidate parent
    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Root-to-top path
    pub fn path(&self) -> &[T] {
        &self.entries
    }
}
