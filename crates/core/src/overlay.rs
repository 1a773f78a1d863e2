//! Overlay styling for detected faces.
//!
//! | Identity                     | Color  | Label                 |
//! |------------------------------|--------|-----------------------|
//! | subject                      | green  | `Similarity: 0.042`   |
//! | visitor, no score            | green  | `NEW`                 |
//! | visitor, with score          | yellow | `Similarity: 0.310`   |
//! | unresolved                   | yellow | (empty)               |

use serde::Serialize;

use crate::detection::{format_similarity, DetectionResult, Identity};
use crate::geometry::{scale_box, DisplaySize, ScreenRect};

/// Label drawn over a visitor the recognizer has never seen before.
pub const NEW_VISITOR_LABEL: &str = "NEW";

/// Stroke width of the box outline, in display pixels.
pub const BOX_LINE_WIDTH: f64 = 3.0;

/// Vertical gap between the label baseline and the top edge of the box.
pub const LABEL_OFFSET: f64 = 5.0;

/// Stroke and label color of an overlay box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayColor {
    Green,
    Yellow,
}

impl OverlayColor {
    /// CSS hex value used by the dashboard palette.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Yellow => "#eab308",
        }
    }
}

/// Screen-space rendering of one detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayAnnotation {
    pub rect: ScreenRect,
    pub color: OverlayColor,
    pub label: String,
}

impl DisplayAnnotation {
    /// Where the label text starts: the box's top-left corner, lifted by [`LABEL_OFFSET`].
    pub fn label_origin(&self) -> (f64, f64) {
        (self.rect.x, self.rect.y - LABEL_OFFSET)
    }
}

/// Color and label for a detection.
pub fn overlay_style(detection: &DetectionResult) -> (OverlayColor, String) {
    match &detection.identity {
        Identity::Subject(_) => (OverlayColor::Green, similarity_label(detection.similarity)),
        Identity::Visitor(_) => match detection.similarity {
            None => (OverlayColor::Green, NEW_VISITOR_LABEL.to_string()),
            Some(score) => (OverlayColor::Yellow, similarity_label(Some(score))),
        },
        Identity::Unresolved => (OverlayColor::Yellow, String::new()),
    }
}

fn similarity_label(similarity: Option<f64>) -> String {
    format!("Similarity: {}", format_similarity(similarity))
}

/// Build the annotation for a detection on a display of the given size.
///
/// The box is clipped to the source frame before it is scaled.
pub fn annotate(detection: &DetectionResult, display: DisplaySize) -> DisplayAnnotation {
    let (color, label) = overlay_style(detection);
    DisplayAnnotation {
        rect: scale_box(&detection.bounding_box.clamp_to_frame(), display),
        color,
        label,
    }
}
