//! Shared test utilities.
//!
//! Image fixtures are generated on the fly with the `image` crate so tests
//! never depend on binary files checked into the repo.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("dawn.jpg");
//! create_test_jpeg(&path, 400, 300);
//!
//! let session = session_with_photos(5, LayoutMode::TwoByTwo);
//! assert_eq!(session.page_count(), 2);
//! ```

use crate::layout::LayoutMode;
use crate::session::Session;
use crate::store::PhotoRef;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = BufWriter::new(File::create(path).unwrap());
    JpegEncoder::new_with_quality(file, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a half-transparent PNG of the given size.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([200, 40, 40, if x % 2 == 0 { 255 } else { 64 }])
    });
    img.save(path).unwrap();
}

/// Write bytes that no decoder accepts.
pub fn write_corrupt_file(path: &Path) {
    std::fs::write(path, b"\xFF\xD8 definitely not a jpeg").unwrap();
}

// =========================================================================
// Sessions
// =========================================================================

/// A "Photo"-prefixed session holding `p0.jpg` .. `p{n-1}.jpg`, all placed
/// at their default coordinates with default captions.
pub fn session_with_photos(n: usize, layout: LayoutMode) -> Session {
    let mut session = Session::new(layout, "Photo");
    session.add_photos((0..n).map(|i| PhotoRef::new(format!("p{i}.jpg"))));
    session.fill_gaps();
    session
}
