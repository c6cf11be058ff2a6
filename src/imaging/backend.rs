//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the renderer needs:
//! identify and compress.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` in this module.

use super::params::CompressParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A photo re-encoded for embedding: baseline RGB JPEG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions without re-encoding.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode, flatten to RGB, downscale and JPEG-encode one photo.
    fn compress(
        &self,
        path: &Path,
        params: &CompressParams,
    ) -> Result<CompressedImage, BackendError>;
}
