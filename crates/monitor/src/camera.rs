//! Camera sources.
//!
//! A [`Camera`] hands out a live [`CameraStream`] for a set of
//! [`StreamConstraints`]; the capture loop samples the stream's current
//! frame once per tick and stops every track when the session ends.
//!
//! Two sources ship with the crate:
//! - [`SyntheticCamera`]: a generated moving test pattern, no hardware needed.
//! - [`StillImageCamera`]: serves a decoded image file as a constant feed.

use std::path::PathBuf;

use async_trait::async_trait;
use image::{imageops, Rgb, RgbImage};

use presence_core::geometry::{SOURCE_FRAME_HEIGHT, SOURCE_FRAME_WIDTH};

/// Default capture frame rate requested from the camera.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Video-only stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: SOURCE_FRAME_WIDTH,
            height: SOURCE_FRAME_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The user or platform refused access to the camera.
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera (missing device, unreadable source, etc.).
    #[error("No camera available: {0}")]
    Unavailable(String),

    /// The stream's tracks have been stopped.
    #[error("Camera stream stopped")]
    Stopped,
}

/// Something that can open a camera stream.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn open(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live camera stream.
pub trait CameraStream: Send {
    /// The frame currently being shown, at the stream's native size.
    fn current_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Stop every track. Later calls to [`current_frame`](Self::current_frame) fail.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Synthetic test pattern
// ---------------------------------------------------------------------------

/// Side of the bright square that sweeps across the synthetic frame.
const PATTERN_SQUARE: u32 = 96;

/// Horizontal distance the square moves per sampled frame.
const PATTERN_STEP: u32 = 40;

/// Camera that renders a moving square over a gradient.
#[derive(Debug, Default)]
pub struct SyntheticCamera;

impl SyntheticCamera {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Camera for SyntheticCamera {
    async fn open(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        if constraints.width == 0 || constraints.height == 0 {
            return Err(CameraError::Unavailable(format!(
                "cannot synthesize a {}x{} stream",
                constraints.width, constraints.height
            )));
        }
        tracing::info!(
            width = constraints.width,
            height = constraints.height,
            "Opened synthetic camera"
        );
        Ok(Box::new(SyntheticStream {
            constraints,
            frame_index: 0,
            active: true,
        }))
    }
}

struct SyntheticStream {
    constraints: StreamConstraints,
    frame_index: u32,
    active: bool,
}

impl CameraStream for SyntheticStream {
    fn current_frame(&mut self) -> Result<RgbImage, CameraError> {
        if !self.active {
            return Err(CameraError::Stopped);
        }
        let (w, h) = (self.constraints.width, self.constraints.height);
        let span = w.saturating_sub(PATTERN_SQUARE).max(1);
        let left = self.frame_index.wrapping_mul(PATTERN_STEP) % span;
        let top = h.saturating_sub(PATTERN_SQUARE) / 2;
        self.frame_index = self.frame_index.wrapping_add(1);

        Ok(RgbImage::from_fn(w, h, |x, y| {
            let inside = (left..left + PATTERN_SQUARE).contains(&x)
                && (top..top + PATTERN_SQUARE).contains(&y);
            if inside {
                Rgb([240, 240, 240])
            } else {
                let shade = (u64::from(y) * 160 / u64::from(h)) as u8;
                Rgb([20, 30, 40u8.saturating_add(shade)])
            }
        }))
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ---------------------------------------------------------------------------
// Still image
// ---------------------------------------------------------------------------

/// Camera whose feed is a single image file, decoded on every `open`.
///
/// The image is scaled to the requested constraints, as a real camera
/// would deliver frames at the negotiated size.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Camera for StillImageCamera {
    async fn open(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        let path = self.path.clone();
        let decoded = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| CameraError::Unavailable(format!("image decoder task failed: {e}")))?
            .map_err(|e| {
                CameraError::Unavailable(format!("cannot read {}: {e}", self.path.display()))
            })?;

        let mut frame = decoded.into_rgb8();
        if frame.dimensions() != (constraints.width, constraints.height)
            && constraints.width > 0
            && constraints.height > 0
        {
            frame = imageops::resize(
                &frame,
                constraints.width,
                constraints.height,
                imageops::FilterType::Triangle,
            );
        }

        tracing::info!(path = %self.path.display(), "Opened still-image camera");
        Ok(Box::new(StillImageStream {
            frame,
            active: true,
        }))
    }
}

struct StillImageStream {
    frame: RgbImage,
    active: bool,
}

impl CameraStream for StillImageStream {
    fn current_frame(&mut self) -> Result<RgbImage, CameraError> {
        if !self.active {
            return Err(CameraError::Stopped);
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    impl std::fmt::Debug for dyn CameraStream {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("CameraStream")
        }
    }

    #[tokio::test]
    async fn synthetic_stream_matches_constraints() {
        let constraints = StreamConstraints {
            width: 320,
            height: 180,
            frame_rate: 30,
        };
        let mut stream = SyntheticCamera::new().open(constraints).await.unwrap();
        let first = stream.current_frame().unwrap();
        let second = stream.current_frame().unwrap();
        assert_eq!(first.dimensions(), (320, 180));
        assert_ne!(first, second, "pattern should move between frames");
    }

    #[tokio::test]
    async fn stopped_stream_yields_no_frames() {
        let mut stream = SyntheticCamera::new()
            .open(StreamConstraints::default())
            .await
            .unwrap();
        assert!(stream.is_active());
        stream.stop();
        assert!(!stream.is_active());
        assert_matches!(stream.current_frame(), Err(CameraError::Stopped));
    }

    #[tokio::test]
    async fn synthetic_rejects_empty_constraints() {
        let constraints = StreamConstraints {
            width: 0,
            height: 720,
            frame_rate: 30,
        };
        assert_matches!(
            SyntheticCamera::new().open(constraints).await,
            Err(CameraError::Unavailable(_))
        );
    }

    #[tokio::test]
    async fn still_image_missing_file_is_unavailable() {
        let camera = StillImageCamera::new("/nonexistent/presence/frame.png");
        assert_matches!(
            camera.open(StreamConstraints::default()).await,
            Err(CameraError::Unavailable(_))
        );
    }

    #[tokio::test]
    async fn still_image_is_scaled_to_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        RgbImage::from_pixel(64, 48, Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();

        let mut stream = StillImageCamera::new(&path)
            .open(StreamConstraints::default())
            .await
            .unwrap();
        let frame = stream.current_frame().unwrap();
        assert_eq!(frame.dimensions(), (1280, 720));
        let px = frame.get_pixel(640, 360);
        for (got, want) in px.0.iter().zip([10u8, 200, 30]) {
            assert!(got.abs_diff(want) <= 1, "channel {got} vs {want}");
        }
    }
}
