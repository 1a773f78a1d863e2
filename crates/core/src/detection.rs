//! Recognition results and the identity rules derived from them.
//!
//! The recognizer reports each face with an optional enrolled-user id and
//! an optional visitor id. At most one of them is meaningful: a face is
//! either a known subject, a visitor, or not yet classified at all.

use serde::Serialize;

use crate::geometry::BoundingBox;
use crate::types::EntityId;

/// Literal shown in place of a similarity score that the recognizer did not report.
pub const MISSING_SIMILARITY: &str = "NULL";

/// Number of id characters kept in a synthesized fallback label.
const FALLBACK_ID_CHARS: usize = 8;

/// Who a detected face belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Identity {
    /// An enrolled user (student).
    Subject(EntityId),
    /// An unenrolled visitor, either newly seen or previously seen.
    Visitor(EntityId),
    /// The recognizer returned neither id.
    Unresolved,
}

impl Identity {
    /// Build an identity from the two optional wire ids.
    ///
    /// Empty strings count as absent. If both ids are present the
    /// subject id wins and the visitor id is ignored.
    pub fn from_ids(user_id: Option<String>, visitor_id: Option<String>) -> Self {
        let user_id = user_id.filter(|id| !id.is_empty());
        let visitor_id = visitor_id.filter(|id| !id.is_empty());
        match (user_id, visitor_id) {
            (Some(id), _) => Self::Subject(id),
            (None, Some(id)) => Self::Visitor(id),
            (None, None) => Self::Unresolved,
        }
    }

    /// Classification shown next to the detection.
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::Subject(_) => SubjectKind::Student,
            Self::Visitor(_) | Self::Unresolved => SubjectKind::Visitor,
        }
    }

    /// Label used when the backend cannot supply a display name.
    ///
    /// `None` for unresolved faces, which have nothing to look up.
    pub fn fallback_name(&self) -> Option<String> {
        match self {
            Self::Subject(id) => Some(format!("User {}", id_prefix(id))),
            Self::Visitor(id) => Some(format!("Visitor {}", id_prefix(id))),
            Self::Unresolved => None,
        }
    }
}

fn id_prefix(id: &str) -> &str {
    match id.char_indices().nth(FALLBACK_ID_CHARS) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Coarse classification of a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubjectKind {
    Student,
    Visitor,
}

impl SubjectKind {
    /// Label shown in the detected list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Visitor => "Visitor",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One face found by the recognizer in a submitted frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub identity: Identity,
    /// Distance to the closest stored reference. Absent for a newly seen visitor.
    pub similarity: Option<f64>,
    /// Box in source-frame coordinates.
    pub bounding_box: BoundingBox,
}

impl DetectionResult {
    /// A visitor without a score has never been seen before.
    pub fn is_new_visitor(&self) -> bool {
        matches!(self.identity, Identity::Visitor(_)) && self.similarity.is_none()
    }
}

/// Format a similarity score to exactly three decimals, or `"NULL"` if absent.
pub fn format_similarity(similarity: Option<f64>) -> String {
    match similarity {
        Some(score) => format!("{score:.3}"),
        None => MISSING_SIMILARITY.to_string(),
    }
}

/// One row of the "currently detected" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionEntry {
    /// Position of the face within its tick's results.
    pub index: usize,
    /// Display name; empty for unresolved faces.
    pub name: String,
    pub kind: SubjectKind,
    /// Score rendered by [`format_similarity`].
    pub similarity: String,
}

impl DetectionEntry {
    /// Combine a detection with its resolved display name.
    pub fn new(index: usize, detection: &DetectionResult, name: Option<String>) -> Self {
        Self {
            index,
            name: name.unwrap_or_default(),
            kind: detection.identity.kind(),
            similarity: format_similarity(detection.similarity),
        }
    }
}
