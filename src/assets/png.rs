//! PNG textures.
//!
//! Decoding is delegated to the `image` crate; this module keeps RGB and
//! RGBA sources, flips rows so the first row in memory is the bottom of
//! the picture, and stores the pixels in a [`Buffer`] of `u8` or `u16`
//! channels.

use std::io::Cursor;

use image::codecs::png::PngDecoder;
use image::{ColorType, ExtendedColorType, ImageDecoder};

use crate::util::{Buffer, Content, Error, Result};
use crate::{enum_schema, schema};

/// Channel layout of a decoded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageColor {
    #[default]
    Rgb,
    Rgba,
}

enum_schema!(ImageColor { Rgb => "rgb", Rgba => "rgba" });

impl ImageColor {
    /// Samples per pixel.
    pub fn channels(self) -> u8 {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Decoded image with bottom-up rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Bits per channel in `pixels` (8 or 16).
    pub bit_depth: u8,
    pub channels: u8,
    pub color: ImageColor,
    /// `width * height * channels` samples, `u8` or `u16` by bit depth.
    pub pixels: Buffer,
}

schema!(Image { width, height, bit_depth, channels, color, pixels });

/// Decodes PNG content.
pub struct ImageStructurer<'a> {
    content: &'a Content,
}

impl<'a> ImageStructurer<'a> {
    /// Create a structurer bound to `content`.
    pub fn new(content: &'a Content) -> Self {
        Self { content }
    }

    /// Decode into `target`, which is left untouched on failure.
    ///
    /// Sources other than RGB/RGBA at 1 to 16 bits per channel fail with
    /// [`Error::UnsupportedImage`].
    pub fn read(self, target: &mut Image) -> Result<()> {
        match self.decode() {
            Ok(image) => {
                tracing::debug!(
                    path = %self.content.path().display(),
                    width = image.width,
                    height = image.height,
                    bit_depth = image.bit_depth,
                    "decoded image"
                );
                *target = image;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %self.content.path().display(), error = %e, "image decode failed");
                Err(e.in_content(self.content.path()))
            }
        }
    }

    /// Decode into a fresh [`Image`].
    pub fn read_value(self) -> Result<Image> {
        let mut image = Image::default();
        self.read(&mut image)?;
        Ok(image)
    }

    fn decode(&self) -> Result<Image> {
        let decoder = PngDecoder::new(Cursor::new(self.content.data()))?;
        let color = match decoder.original_color_type() {
            ExtendedColorType::Rgb1
            | ExtendedColorType::Rgb2
            | ExtendedColorType::Rgb4
            | ExtendedColorType::Rgb8
            | ExtendedColorType::Rgb16 => ImageColor::Rgb,
            ExtendedColorType::Rgba1
            | ExtendedColorType::Rgba2
            | ExtendedColorType::Rgba4
            | ExtendedColorType::Rgba8
            | ExtendedColorType::Rgba16 => ImageColor::Rgba,
            other => return Err(Error::UnsupportedImage(format!("color type {:?}", other))),
        };

        let (width, height) = decoder.dimensions();
        let decoded = decoder.color_type();
        let bit_depth = match decoded {
            ColorType::Rgb8 | ColorType::Rgba8 => 8,
            ColorType::Rgb16 | ColorType::Rgba16 => 16,
            other => return Err(Error::UnsupportedImage(format!("decoded layout {:?}", other))),
        };
        let total = usize::try_from(decoder.total_bytes())
            .map_err(|_| Error::UnsupportedImage(format!("{}x{} is too large", width, height)))?;

        let mut raw = vec![0u8; total];
        decoder.read_image(&mut raw)?;

        let channels = color.channels();
        let samples = width as usize * height as usize * channels as usize;
        let mut pixels = Buffer::new();
        if bit_depth == 8 {
            pixels.reshape::<u8>(samples)?;
        } else {
            pixels.reshape::<u16>(samples)?;
        }

        let row = total / (height.max(1) as usize);
        let dst = pixels.as_bytes_mut();
        for (y, src) in raw.chunks_exact(row.max(1)).enumerate() {
            let flipped = height as usize - 1 - y;
            dst[flipped * row..(flipped + 1) * row].copy_from_slice(src);
        }

        Ok(Image {
            width,
            height,
            bit_depth,
            channels,
            color,
            pixels,
        })
    }
}
