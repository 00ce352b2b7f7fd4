//! Placement geometry shared by both document encoders
//!
//! All lengths are centimetres. `x`/`y` locate the lower-left corner of the
//! image measured from the lower-left corner of the page.

use crate::constants::{CM_PER_INCH, EXPORT_PPI, REFERENCE_PPI};
use crate::options::LayoutSettings;

/// Final physical size and position of one image on its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
    /// Pixel size to resample to before embedding (fit mode only)
    pub resample: Option<(u32, u32)>,
}

/// Fit an image into the available box, preserving its aspect ratio.
///
/// Fits to the width first and re-fits to the height if that overflows.
pub fn resolve(
    image_w_px: u32,
    image_h_px: u32,
    available_w: f32,
    available_h: f32,
) -> (f32, f32) {
    if image_w_px == 0 || image_h_px == 0 || available_w <= 0.0 || available_h <= 0.0 {
        return (0.0, 0.0);
    }

    let aspect = image_h_px as f32 / image_w_px as f32;
    let mut width = available_w;
    let mut height = width * aspect;

    if height > available_h {
        height = available_h;
        width = height / aspect;
    }

    (width, height)
}

/// Pixel size converted to centimetres at the given resolution
pub fn native_size(px_w: u32, px_h: u32, ppi_x: f32, ppi_y: f32) -> (f32, f32) {
    let ppi_x = if ppi_x > 0.0 { ppi_x } else { REFERENCE_PPI };
    let ppi_y = if ppi_y > 0.0 { ppi_y } else { REFERENCE_PPI };
    (
        px_w as f32 / ppi_x * CM_PER_INCH,
        px_h as f32 / ppi_y * CM_PER_INCH,
    )
}

/// Pixel dimensions of a bitmap printed at `w_cm` x `h_cm` and 300 ppi
pub fn resample_target(w_cm: f32, h_cm: f32) -> (u32, u32) {
    let to_px = |cm: f32| ((cm / CM_PER_INCH * EXPORT_PPI).floor() as u32).max(1);
    (to_px(w_cm), to_px(h_cm))
}

/// Size and centre an image of `dimensions` pixels on the page
pub fn place(settings: &LayoutSettings, dimensions: (u32, u32), ppi: (f32, f32)) -> Placement {
    let (page_w, page_h) = settings.page_dimensions_cm();
    let (px_w, px_h) = dimensions;

    let (width, height, resample) = if settings.scale_to_page_width {
        let (available_w, available_h) = settings.available_area_cm();
        let (w, h) = resolve(px_w, px_h, available_w, available_h);
        (w, h, Some(resample_target(w, h)))
    } else {
        let (w, h) = native_size(px_w, px_h, ppi.0, ppi.1);
        (w, h, None)
    };

    Placement {
        width,
        height,
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        resample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn test_resolve_landscape_image_fits_width() {
        let (w, h) = resolve(2000, 1000, 19.0, 27.7);
        assert_eq!(w, 19.0);
        assert!((h - 9.5).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_tall_image_fits_height() {
        let (w, h) = resolve(1000, 4000, 19.0, 27.7);
        assert_eq!(h, 27.7);
        assert!((w - 6.925).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_degenerate() {
        assert_eq!(resolve(0, 100, 19.0, 27.7), (0.0, 0.0));
        assert_eq!(resolve(100, 100, 0.0, 27.7), (0.0, 0.0));
    }

    #[test]
    fn test_native_size_at_72_ppi() {
        let (w, h) = native_size(720, 360, 72.0, 72.0);
        assert!((w - 25.4).abs() < 1e-4);
        assert!((h - 12.7).abs() < 1e-4);
    }

    #[test]
    fn test_resample_target_floor_and_minimum() {
        assert_eq!(resample_target(2.54, 2.54), (300, 300));
        assert_eq!(resample_target(0.001, 0.0), (1, 1));
    }

    #[test]
    fn test_place_centres_image() {
        let settings = LayoutSettings::default();
        let placement = place(&settings, (1000, 1000), (72.0, 72.0));
        assert!((placement.width - 19.0).abs() < 1e-5);
        assert!((placement.x - 1.0).abs() < 1e-5);
        assert!((placement.y - (29.7 - 19.0) / 2.0).abs() < 1e-5);
        assert!(placement.resample.is_some());
    }

    #[test]
    fn test_place_native_overflows_without_resample() {
        let settings = LayoutSettings {
            scale_to_page_width: false,
            orientation: Orientation::Landscape,
            ..Default::default()
        };
        let placement = place(&settings, (1440, 72), (72.0, 72.0));
        assert!((placement.width - 50.8).abs() < 1e-3);
        assert!(placement.x < 0.0);
        assert_eq!(placement.resample, None);
    }
}
