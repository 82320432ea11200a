//! Resolution-marker detection
//!
//! Gradle appends `(c)`, `(*)` or `(n)` to some dependency lines. A marked
//! line is kept only if its kind is enabled.

use gradlegraph_core::{ResolutionKind, ResolutionSettings};

/// Classifier verdict for one tree line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Process the line; `text` has the marker and its separating space removed
    Keep { kind: ResolutionKind, text: &'a str },

    /// Drop the whole line, its kind is disabled
    Skipped(ResolutionKind),
}

/// Detects trailing resolution markers against an enablement table
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionClassifier {
    settings: ResolutionSettings,
}

impl ResolutionClassifier {
    pub fn new(settings: ResolutionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolutionSettings {
        &self.settings
    }

    /// Classify a tree line; first matching marker wins
    pub fn classify<'a>(&self, line: &'a str) -> Resolution<'a> {
        let trimmed = line.trim_end();

        for kind in ResolutionKind::MARKED {
            let Some(marker) = kind.marker() else { continue };
            let Some(rest) = trimmed.strip_suffix(marker) else { continue };

            if !self.settings.is_enabled(kind) {
                return Resolution::Skipped(kind);
            }

            let text = rest.strip_suffix(' ').unwrap_or(rest);
            return Resolution::Keep { kind, text };
        }

        Resolution::Keep {
            kind: ResolutionKind::Normal,
            text: line,
        }
    }
}
