//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image` crate (pure Rust decoders) |
//! | Flatten to RGB | `DynamicImage::to_rgb8` (drops alpha and palette) |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, CompressedImage, Dimensions, ImageBackend};
use super::calculations::fit_within;
use super::params::CompressParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension this backend can decode.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn encode_jpeg(img: &image::RgbImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn compress(
        &self,
        path: &Path,
        params: &CompressParams,
    ) -> Result<CompressedImage, BackendError> {
        let rgb = load_image(path)?.to_rgb8();
        let (width, height) = fit_within(rgb.dimensions(), params.max_edge);

        let rgb = if (width, height) == rgb.dimensions() {
            rgb
        } else {
            image::imageops::resize(&rgb, width, height, FilterType::Lanczos3)
        };

        let jpeg = encode_jpeg(&rgb, params.quality.as_u8())?;
        Ok(CompressedImage {
            jpeg,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{create_test_jpeg, create_test_png_rgba, write_corrupt_file};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = super::supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn is_supported_image_ignores_case() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("scan.tiff")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn compress_downscales_large_landscape() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("wide.jpg");
        create_test_jpeg(&path, 2000, 1000);

        let image = RustBackend::new()
            .compress(&path, &CompressParams::default())
            .unwrap();

        assert_eq!(image.dimensions(), (1600, 800));
        let decoded = image::load_from_memory(&image.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 800));
    }

    #[test]
    fn compress_keeps_small_image_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("small.jpg");
        create_test_jpeg(&path, 300, 400);

        let image = RustBackend::new()
            .compress(&path, &CompressParams::default())
            .unwrap();

        assert_eq!(image.dimensions(), (300, 400));
    }

    #[test]
    fn compress_flattens_alpha_to_rgb_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("alpha.png");
        create_test_png_rgba(&path, 64, 32);

        let image = RustBackend::new()
            .compress(&path, &CompressParams::default())
            .unwrap();

        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&image.jpeg).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn compress_is_deterministic() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("same.jpg");
        create_test_jpeg(&path, 500, 500);

        let backend = RustBackend::new();
        let params = CompressParams {
            max_edge: 200,
            quality: Quality::new(80),
        };
        let a = backend.compress(&path, &params).unwrap();
        let b = backend.compress(&path, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn compress_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        write_corrupt_file(&path);

        let result = RustBackend::new().compress(&path, &CompressParams::default());
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn compress_missing_file_is_io_error() {
        let result =
            RustBackend::new().compress(Path::new("/nonexistent/x.jpg"), &CompressParams::default());
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
