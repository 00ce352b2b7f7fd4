use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::loader::{apply_mirror, decode, read_bytes};
use crate::types::*;
use crate::{ImageLoadError, Result};

/// Tile view thumbnail bounds used by the session front ends
pub const TILE_THUMBNAIL: (u32, u32) = (120, 120);

/// Single pair preview bounds
pub const PREVIEW_THUMBNAIL: (u32, u32) = (400, 300);

/// Decode, mirror and shrink an image to fit within `max_w` x `max_h`.
///
/// Aspect ratio is preserved and small images are never enlarged.
pub fn thumbnail(
    reference: &ImageRef,
    mirror: MirrorMode,
    max_w: u32,
    max_h: u32,
) -> std::result::Result<DynamicImage, ImageLoadError> {
    let bytes = read_bytes(reference)?;
    let image = apply_mirror(decode(reference, &bytes)?, mirror);
    Ok(shrink_to_fit(image, max_w, max_h))
}

/// Async wrapper running the decode on the blocking pool
pub async fn generate_thumbnail(
    reference: ImageRef,
    mirror: MirrorMode,
    max_w: u32,
    max_h: u32,
) -> Result<DynamicImage> {
    let image =
        tokio::task::spawn_blocking(move || thumbnail(&reference, mirror, max_w, max_h)).await??;
    Ok(image)
}

fn shrink_to_fit(image: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_w && height <= max_h {
        return image;
    }
    image.resize(max_w.max(1), max_h.max(1), FilterType::Lanczos3)
}
