//! Coordinate and version grammar
//!
//! ```text
//! group:artifact -> version          no version requested, resolved directly
//! group:artifact:version
//! group:artifact:version -> other   requested version replaced by conflict resolution
//! ```

use crate::error::GrammarIssue;

/// Separator between coordinate fields
pub const FIELD_SEPARATOR: char = ':';

/// Arrow Gradle prints between a requested and a resolved version
pub const RESOLVED_ARROW: &str = "->";

/// Parsed artifact coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,

    /// Version as written in the build file (or the only version shown)
    pub specified_version: Option<String>,

    /// Version Gradle actually picked, when it differs
    pub resolved_version: Option<String>,
}

/// Split on the arrow; at most one arrow is allowed
fn split_arrow(text: &str) -> Result<(&str, Option<&str>), GrammarIssue> {
    let mut parts = text.split(RESOLVED_ARROW);
    let left = parts.next().unwrap_or_default();
    let right = parts.next();

    if parts.next().is_some() {
        return Err(GrammarIssue::AmbiguousArrow);
    }

    Ok((left.trim(), right.map(str::trim)))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse the coordinate text of a tree line
pub fn parse_coordinate(text: &str) -> Result<Coordinate, GrammarIssue> {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();

    let (group_id, artifact_id, specified_version, resolved_version) = match fields.as_slice() {
        [group, artifact] => {
            // The arrow's right side is the only version there is
            let (artifact, version) = split_arrow(artifact)?;
            (group.trim(), artifact, version.and_then(non_empty), None)
        }
        [group, artifact, version] => {
            let (specified, resolved) = split_arrow(version)?;
            (
                group.trim(),
                artifact.trim(),
                non_empty(specified),
                resolved.and_then(non_empty),
            )
        }
        _ => return Err(GrammarIssue::FieldCount { found: fields.len() }),
    };

    if group_id.is_empty() || artifact_id.is_empty() {
        return Err(GrammarIssue::EmptyField);
    }

    if specified_version.is_none() && resolved_version.is_none() {
        return Err(GrammarIssue::NoVersion);
    }

    Ok(Coordinate {
        group_id: group_id.to_string(),
        artifact_id: artifact_id.to_string(),
        specified_version,
        resolved_version,
    })
}
