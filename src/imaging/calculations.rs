//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` down so neither side exceeds `max_edge`.
///
/// Aspect ratio is preserved and images already within bounds are returned
/// unchanged. Neither side rounds down to zero.
///
/// # Examples
/// ```
/// # use photo_grid::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 1600), (1600, 1200));
/// assert_eq!(fit_within((800, 600), 1600), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= max_edge {
        return (w, h);
    }

    let ratio = max_edge as f64 / longer as f64;
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
    if w >= h {
        (max_edge, scale(h))
    } else {
        (scale(w), max_edge)
    }
}

/// Which bound an image is pinned to when placed in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Width equals the maximum width; height follows the aspect ratio.
    Width,
    /// Height equals the maximum height; width follows the aspect ratio.
    Height,
}

/// Pick the fit for an image of `size` pixels inside `bounds` points.
///
/// Images relatively wider than the bounds are pinned to the width,
/// everything else to the height.
pub fn choose_fit(size: (u32, u32), bounds: (f32, f32)) -> ImageFit {
    let (w, h) = size;
    let (max_w, max_h) = bounds;
    if h == 0 || max_h <= 0.0 {
        return ImageFit::Width;
    }
    let image_ratio = w as f32 / h as f32;
    if image_ratio > max_w / max_h {
        ImageFit::Width
    } else {
        ImageFit::Height
    }
}

/// Display size in points of an image of `size` pixels inside `bounds`.
pub fn display_size(size: (u32, u32), bounds: (f32, f32)) -> (f32, f32) {
    let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
    let (max_w, max_h) = bounds;
    match choose_fit(size, bounds) {
        ImageFit::Width => (max_w, max_w * h / w),
        ImageFit::Height => (max_h * w / h, max_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_landscape_pins_width() {
        assert_eq!(fit_within((4000, 3000), 1600), (1600, 1200));
    }

    #[test]
    fn fit_portrait_pins_height() {
        assert_eq!(fit_within((3000, 4000), 1600), (1200, 1600));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within((640, 480), 1600), (640, 480));
        assert_eq!(fit_within((1600, 1600), 1600), (1600, 1600));
    }

    #[test]
    fn fit_extreme_panorama_keeps_one_pixel() {
        assert_eq!(fit_within((20000, 4), 1600), (1600, 1));
    }

    // =========================================================================
    // choose_fit / display_size tests
    // =========================================================================

    #[test]
    fn wide_image_fits_width() {
        // 3:2 landscape in a 3.3 x 3.4 inch cell
        assert_eq!(choose_fit((1500, 1000), (237.6, 244.8)), ImageFit::Width);
    }

    #[test]
    fn tall_image_fits_height() {
        assert_eq!(choose_fit((1000, 1500), (237.6, 244.8)), ImageFit::Height);
    }

    #[test]
    fn equal_ratio_fits_height() {
        assert_eq!(choose_fit((200, 100), (200.0, 100.0)), ImageFit::Height);
    }

    #[test]
    fn display_size_stays_inside_bounds() {
        let bounds = (504.0, 244.8);
        for size in [(1600, 1200), (1200, 1600), (1600, 400), (100, 100)] {
            let (w, h) = display_size(size, bounds);
            assert!(w <= bounds.0 + 0.01, "{size:?} -> width {w}");
            assert!(h <= bounds.1 + 0.01, "{size:?} -> height {h}");
        }
    }

    #[test]
    fn display_size_preserves_aspect() {
        let (w, h) = display_size((1600, 1200), (237.6, 244.8));
        assert!((w - 237.6).abs() < 0.01);
        assert!((h - 178.2).abs() < 0.01);
    }
}
