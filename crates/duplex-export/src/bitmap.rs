//! Page bitmaps held between preparation and encoding
//!
//! Pixels are stored as zlib-compressed 8-bit RGB with any alpha flattened
//! onto white, so a prepared document costs about its compressed size in
//! memory. The PDF encoder embeds the stream as it is; the DOCX encoder
//! inflates one page at a time to write PNG media.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, RgbImage};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlateBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FlateBitmap {
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());

        let rgb = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            let mut data = Vec::with_capacity(width as usize * height as usize * 3);
            for pixel in rgba.pixels() {
                let alpha = pixel[3] as f32 / 255.0;
                for channel in &pixel.0[..3] {
                    data.push((*channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
                }
            }
            data
        } else {
            image.to_rgb8().into_raw()
        };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&rgb)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The FlateDecode stream body
    pub fn compressed(&self) -> &[u8] {
        &self.data
    }

    /// Inflate back to an RGB image
    pub fn to_rgb(&self) -> Result<RgbImage> {
        let mut raw = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        ZlibDecoder::new(self.data.as_slice()).read_to_end(&mut raw)?;
        RgbImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "bitmap data does not match {} x {} pixels",
                    self.width, self.height
                ),
            )
            .into()
        })
    }
}
