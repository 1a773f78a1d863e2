//! Frame rasterisation and encoding.
//!
//! Each tick draws the current camera frame onto a fixed
//! [`SOURCE_FRAME_WIDTH`] x [`SOURCE_FRAME_HEIGHT`] raster (stretching,
//! not letterboxing), compresses it as JPEG, and base64-encodes the bytes
//! for the JSON submission body.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};

use presence_core::geometry::{SOURCE_FRAME_HEIGHT, SOURCE_FRAME_WIDTH};

/// JPEG quality used for submitted frames (0.85 on a 0..1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Errors from [`EncodedFrame::encode`].
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Cannot encode an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// A frame ready for submission.
///
/// Encoding is CPU-bound; async callers run it on the blocking pool.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    jpeg_len: usize,
    base64: String,
}

impl EncodedFrame {
    /// Rasterise `frame` to the source size and encode it.
    pub fn encode(frame: &RgbImage, quality: u8) -> Result<Self, EncodeError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyFrame { width, height });
        }

        let raster = rasterize(frame);
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(&raster)?;

        Ok(Self {
            jpeg_len: jpeg.len(),
            base64: BASE64_STANDARD.encode(&jpeg),
        })
    }

    /// Compressed size before base64.
    pub fn jpeg_len(&self) -> usize {
        self.jpeg_len
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }
}

fn rasterize(frame: &RgbImage) -> RgbImage {
    if frame.dimensions() == (SOURCE_FRAME_WIDTH, SOURCE_FRAME_HEIGHT) {
        return frame.clone();
    }
    imageops::resize(
        frame,
        SOURCE_FRAME_WIDTH,
        SOURCE_FRAME_HEIGHT,
        imageops::FilterType::Triangle,
    )
}
