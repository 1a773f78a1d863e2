//! Source-frame geometry and display scaling.
//!
//! The recognizer always sees frames rasterised to a fixed
//! [`SOURCE_FRAME_WIDTH`] x [`SOURCE_FRAME_HEIGHT`] canvas, so every
//! bounding box it returns lives in that coordinate space. The display
//! surface can be any size, and is not required to share the source
//! aspect ratio: each axis is scaled on its own.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Width of the raster submitted for recognition, in pixels.
pub const SOURCE_FRAME_WIDTH: u32 = 1280;

/// Height of the raster submitted for recognition, in pixels.
pub const SOURCE_FRAME_HEIGHT: u32 = 720;

/// Face bounding box in source-frame (1280x720) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip the box to the source frame.
    ///
    /// Boxes that already lie inside the frame come back unchanged.
    /// Non-finite coordinates collapse to zero, and a box that lies fully
    /// outside the frame degenerates to a zero-area box on the nearest edge.
    pub fn clamp_to_frame(&self) -> Self {
        let frame_w = f64::from(SOURCE_FRAME_WIDTH);
        let frame_h = f64::from(SOURCE_FRAME_HEIGHT);

        let left = clamp_axis(self.x, frame_w);
        let top = clamp_axis(self.y, frame_h);
        let right = clamp_axis(finite_or_zero(self.x) + finite_or_zero(self.width), frame_w);
        let bottom = clamp_axis(finite_or_zero(self.y) + finite_or_zero(self.height), frame_h);

        Self {
            x: left,
            y: top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn clamp_axis(v: f64, max: f64) -> f64 {
    finite_or_zero(v).clamp(0.0, max)
}

/// On-screen size of the rendered video element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    /// Build a display size, rejecting zero, negative, or non-finite sides.
    pub fn new(width: f64, height: f64) -> Result<Self, CoreError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Display size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// The display size that maps 1:1 onto the source frame.
    pub fn source_frame() -> Self {
        Self {
            width: f64::from(SOURCE_FRAME_WIDTH),
            height: f64::from(SOURCE_FRAME_HEIGHT),
        }
    }

    /// Per-axis factors that map source-frame pixels onto this display.
    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors {
            x: self.width / f64::from(SOURCE_FRAME_WIDTH),
            y: self.height / f64::from(SOURCE_FRAME_HEIGHT),
        }
    }
}

/// Independent horizontal and vertical scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in display-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Map a source-frame box onto the display, axis by axis.
pub fn scale_box(bbox: &BoundingBox, display: DisplaySize) -> ScreenRect {
    let scale = display.scale_factors();
    ScreenRect {
        x: bbox.x * scale.x,
        y: bbox.y * scale.y,
        width: bbox.width * scale.x,
        height: bbox.height * scale.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    #[test]
    fn identity_display_leaves_box_unchanged() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 150.0);
        let rect = scale_box(&bbox, DisplaySize::source_frame());
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 50.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 150.0);
    }

    #[test]
    fn scaling_is_linear_and_axis_independent() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 1280.0, 720.0),
            BoundingBox::new(640.0, 360.0, 64.0, 72.0),
            BoundingBox::new(12.5, 700.25, 3.0, 19.75),
        ];
        let displays = [(640.0, 360.0), (1920.0, 1080.0), (800.0, 800.0), (333.3, 97.0)];

        for bbox in &boxes {
            for &(w, h) in &displays {
                let display = DisplaySize::new(w, h).unwrap();
                let rect = scale_box(bbox, display);
                assert_close(rect.x, bbox.x * w / 1280.0);
                assert_close(rect.y, bbox.y * h / 720.0);
                assert_close(rect.width, bbox.width * w / 1280.0);
                assert_close(rect.height, bbox.height * h / 720.0);
            }
        }
    }

    #[test]
    fn square_display_does_not_assume_uniform_scale() {
        let display = DisplaySize::new(720.0, 720.0).unwrap();
        let scale = display.scale_factors();
        assert_close(scale.x, 0.5625);
        assert_close(scale.y, 1.0);
    }

    #[test]
    fn display_size_rejects_non_positive_sides() {
        assert!(DisplaySize::new(0.0, 720.0).is_err());
        assert!(DisplaySize::new(1280.0, -1.0).is_err());
        assert!(DisplaySize::new(f64::NAN, 720.0).is_err());
        assert!(DisplaySize::new(f64::INFINITY, 720.0).is_err());
    }

    #[test]
    fn clamp_keeps_in_frame_box() {
        let bbox = BoundingBox::new(10.0, 20.0, 300.0, 400.0);
        assert_eq!(bbox.clamp_to_frame(), bbox);
    }

    #[test]
    fn clamp_trims_overhanging_edges() {
        let bbox = BoundingBox::new(-20.0, 700.0, 100.0, 50.0);
        let clamped = bbox.clamp_to_frame();
        assert_eq!(clamped, BoundingBox::new(0.0, 700.0, 80.0, 20.0));
    }

    #[test]
    fn clamp_collapses_box_outside_frame() {
        let bbox = BoundingBox::new(1400.0, 10.0, 50.0, 50.0);
        let clamped = bbox.clamp_to_frame();
        assert_eq!(clamped.x, 1280.0);
        assert_eq!(clamped.width, 0.0);
    }

    #[test]
    fn clamp_zeroes_non_finite_coordinates() {
        let bbox = BoundingBox::new(f64::NAN, 10.0, 50.0, f64::INFINITY);
        let clamped = bbox.clamp_to_frame();
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.width, 50.0);
        assert_eq!(clamped.height, 0.0);
    }
}
