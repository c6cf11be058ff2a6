//! Image processing: identify and compress photos for embedding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Compress → JPEG** | RGB8 flatten + Lanczos3 downscale + `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and fit math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, CompressedImage, Dimensions, ImageBackend};
pub use calculations::{ImageFit, choose_fit, display_size, fit_within};
pub use params::{CompressParams, MAX_EDGE, Quality};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
