//! Shared constants for layout and export
//!
//! This module centralizes unit conversions and resolution constants used
//! by the layout resolver and both document encoders.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Centimetres per inch
pub const CM_PER_INCH: f32 = 2.54;

/// Points per centimetre (1 inch = 72 points, 1 inch = 2.54cm)
pub const POINTS_PER_CM: f32 = 72.0 / CM_PER_INCH; // ≈ 28.3465

/// English Metric Units per centimetre (DrawingML extents)
pub const EMU_PER_CM: f32 = 360_000.0;

/// Twentieths of a point per centimetre (WordprocessingML page geometry)
pub const TWIPS_PER_CM: f32 = 1440.0 / CM_PER_INCH; // ≈ 566.93

/// Convert centimetres to points
#[inline]
pub fn cm_to_pt(cm: f32) -> f32 {
    cm * POINTS_PER_CM
}

/// Convert points to centimetres
#[inline]
pub fn pt_to_cm(pt: f32) -> f32 {
    pt / POINTS_PER_CM
}

/// Convert centimetres to EMU, rounded to the nearest unit
#[inline]
pub fn cm_to_emu(cm: f32) -> i64 {
    (cm as f64 * EMU_PER_CM as f64).round() as i64
}

/// Convert EMU back to centimetres
#[inline]
pub fn emu_to_cm(emu: i64) -> f32 {
    (emu as f64 / EMU_PER_CM as f64) as f32
}

/// Convert centimetres to twips, rounded to the nearest unit
#[inline]
pub fn cm_to_twips(cm: f32) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

// =============================================================================
// Resolution
// =============================================================================

/// Pixels per inch assumed when an image does not declare its resolution
pub const REFERENCE_PPI: f32 = 72.0;

/// Pixels per inch of resampled export bitmaps
pub const EXPORT_PPI: f32 = 300.0;

// =============================================================================
// Defaults
// =============================================================================

/// Default page margin in centimetres
pub const DEFAULT_MARGIN_CM: f32 = 1.0;

/// Text shown on a page whose back image is absent (flow documents)
pub const NO_BACK_SIDE_TEXT: &str = "(No back side)";

/// Largest accepted page edge in centimetres
pub const MAX_PAPER_CM: f32 = 200.0;

/// Pages emitted per pair (front and back)
pub const PAGES_PER_PAIR: usize = 2;
