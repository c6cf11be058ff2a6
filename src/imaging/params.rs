//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The renderer builds
//! them and the [`backend`](super::backend) does the pixel work, so a mock
//! backend can stand in during tests without changing renderer logic.
//!
//! ## Types
//!
//! - [`Quality`] — JPEG encoding quality (1–100, default 92). Clamped on construction.
//! - [`CompressParams`] — Longest allowed edge plus quality for one compression.

/// Longest edge, in pixels, of an image embedded in the document.
pub const MAX_EDGE: u32 = 1600;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// The quality as the `u8` JPEG encoders take.
    pub fn as_u8(self) -> u8 {
        u8::try_from(self.0).unwrap_or(100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Parameters for compressing one photo before embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    /// Neither output side exceeds this. Smaller images are not upscaled.
    pub max_edge: u32,
    pub quality: Quality,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            max_edge: MAX_EDGE,
            quality: Quality::default(),
        }
    }
}
