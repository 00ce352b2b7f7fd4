//! Image decoding and preprocessing
//!
//! Loading reads the bytes, decodes them with the `image` crate, applies the
//! requested mirror and optionally trims uniform borders. The native
//! resolution is read from PNG `pHYs` or JPEG JFIF headers so that
//! native-size placement can honour it.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};

use crate::constants::{CM_PER_INCH, REFERENCE_PPI};
use crate::types::*;
use crate::ImageLoadError;

/// A decoded bitmap with its origin and native resolution
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub reference: ImageRef,
    pub image: DynamicImage,
    /// Pixels per inch along x and y
    pub ppi: (f32, f32),
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Read the raw bytes behind a reference
pub fn read_bytes(reference: &ImageRef) -> Result<Vec<u8>, ImageLoadError> {
    match reference {
        ImageRef::Path(path) => {
            std::fs::read(path).map_err(|e| ImageLoadError::new(reference, e.to_string()))
        }
        ImageRef::Memory { bytes, .. } => Ok(bytes.to_vec()),
    }
}

/// Decode bytes, guessing the format from content
pub fn decode(reference: &ImageRef, bytes: &[u8]) -> Result<DynamicImage, ImageLoadError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageLoadError::new(reference, e.to_string()))?;
    reader
        .decode()
        .map_err(|e| ImageLoadError::new(reference, e.to_string()))
}

/// Load an image, mirror it, and optionally trim its borders
pub fn load(
    reference: &ImageRef,
    mirror: MirrorMode,
    trim: bool,
) -> Result<DecodedImage, ImageLoadError> {
    let bytes = read_bytes(reference)?;
    let ppi = native_ppi(&bytes);
    let mut image = decode(reference, &bytes)?;

    image = apply_mirror(image, mirror);
    if trim {
        image = trim_borders(image);
    }

    log::debug!(
        "Loaded {} ({}x{} px, {:.0}x{:.0} ppi, mirror {}, trim {})",
        reference,
        image.width(),
        image.height(),
        ppi.0,
        ppi.1,
        mirror,
        trim
    );

    Ok(DecodedImage {
        reference: reference.clone(),
        image,
        ppi,
    })
}

/// Flip an image according to the mirror mode
pub fn apply_mirror(image: DynamicImage, mirror: MirrorMode) -> DynamicImage {
    let image = if mirror.flips_horizontally() {
        image.fliph()
    } else {
        image
    };
    if mirror.flips_vertically() {
        image.flipv()
    } else {
        image
    }
}

/// Crop to the bounding box of non-background content.
///
/// Images with an alpha channel are cropped to their non-transparent pixels;
/// opaque images, and images that are entirely transparent, are cropped to the
/// pixels that differ from white. Nothing to crop leaves the image untouched.
pub fn trim_borders(image: DynamicImage) -> DynamicImage {
    let bbox = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        bounding_box(rgba.width(), rgba.height(), |x, y| {
            rgba.get_pixel(x, y).0[3] != 0
        })
    } else {
        None
    };

    let bbox = bbox.or_else(|| {
        let rgb = image.to_rgb8();
        bounding_box(rgb.width(), rgb.height(), |x, y| {
            rgb.get_pixel(x, y).0 != [255, 255, 255]
        })
    });

    match bbox {
        Some((x, y, width, height)) if (width, height) != image.dimensions() => {
            log::debug!(
                "Trimmed {}x{} to {}x{} at ({}, {})",
                image.width(),
                image.height(),
                width,
                height,
                x,
                y
            );
            image.crop_imm(x, y, width, height)
        }
        _ => image,
    }
}

/// Resample to exact pixel dimensions with Lanczos3
pub fn resample(image: &DynamicImage, width_px: u32, height_px: u32) -> DynamicImage {
    image.resize_exact(width_px.max(1), height_px.max(1), FilterType::Lanczos3)
}

/// `(x, y, width, height)` of the pixels matching `is_content`
fn bounding_box(
    width: u32,
    height: u32,
    is_content: impl Fn(u32, u32) -> bool,
) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for y in 0..height {
        for x in 0..width {
            if is_content(x, y) {
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

// =============================================================================
// Native resolution
// =============================================================================

/// Resolution declared by the file, or 72 ppi on both axes
pub fn native_ppi(bytes: &[u8]) -> (f32, f32) {
    png_ppi(bytes)
        .or_else(|| jfif_ppi(bytes))
        .unwrap_or((REFERENCE_PPI, REFERENCE_PPI))
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Read the `pHYs` chunk of a PNG stream (unit must be the metre)
fn png_ppi(bytes: &[u8]) -> Option<(f32, f32)> {
    if bytes.len() < 8 || bytes[0..8] != PNG_SIGNATURE {
        return None;
    }

    // Chunk layout: length (4), type (4), data (length), crc (4)
    let mut i = 8;
    while i + 8 <= bytes.len() {
        let length = u32::from_be_bytes(bytes[i..i + 4].try_into().ok()?) as usize;
        let chunk_type = &bytes[i + 4..i + 8];
        let data_start = i + 8;
        let data_end = data_start.checked_add(length)?;
        if data_end > bytes.len() {
            return None;
        }

        match chunk_type {
            b"pHYs" if length >= 9 => {
                let data = &bytes[data_start..data_end];
                let ppu_x = u32::from_be_bytes(data[0..4].try_into().ok()?);
                let ppu_y = u32::from_be_bytes(data[4..8].try_into().ok()?);
                if data[8] != 1 || ppu_x == 0 || ppu_y == 0 {
                    return None;
                }
                let per_metre_to_ppi = CM_PER_INCH / 100.0;
                return Some((ppu_x as f32 * per_metre_to_ppi, ppu_y as f32 * per_metre_to_ppi));
            }
            // pHYs must precede the image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        i = data_end + 4;
    }

    None
}

/// Read the density fields of a JPEG JFIF `APP0` segment
fn jfif_ppi(bytes: &[u8]) -> Option<(f32, f32)> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    // APP0 layout after the marker: length (2), "JFIF\0" (5), version (2),
    // units (1), x density (2), y density (2)
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        let length = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if length < 2 {
            return None;
        }

        if marker == 0xE0 {
            let segment = bytes.get(i + 4..i + 2 + length)?;
            if segment.len() < 12 || &segment[0..5] != b"JFIF\0" {
                return None;
            }
            let units = segment[7];
            let x = u16::from_be_bytes([segment[8], segment[9]]) as f32;
            let y = u16::from_be_bytes([segment[10], segment[11]]) as f32;
            if x == 0.0 || y == 0.0 {
                return None;
            }
            return match units {
                1 => Some((x, y)),
                2 => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
                // Aspect ratio only
                _ => None,
            };
        }

        // Start of scan: no more header segments
        if marker == 0xDA {
            return None;
        }
        i += 2 + length;
    }

    None
}
