//! Owned ARGB32 pixel buffers.
//!
//! Cairo surfaces cannot cross threads, so frames leaving the render thread
//! (for export) are copied into a [`RasterImage`] first and turned back into
//! surfaces on the other side.

use std::io::Cursor;

use cairo::{Context, Format, ImageSurface};
use thiserror::Error;

/// Errors raised while converting, encoding or decoding raster images.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Surface is still borrowed by a drawing context: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("PNG stream error: {0}")]
    Png(#[from] cairo::IoError),

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

/// Premultiplied ARGB32 pixels in Cairo's native-endian layout.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: i32,
    height: i32,
    stride: i32,
    data: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl RasterImage {
    /// A fully transparent image.
    pub fn transparent(width: i32, height: i32) -> Result<Self, RasterError> {
        if width <= 0 || height <= 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        let stride = width * 4;
        Ok(Self {
            width,
            height,
            stride,
            data: vec![0; (stride * height) as usize],
        })
    }

    /// Copies the pixels of `surface`, converting to ARGB32 when needed.
    ///
    /// Fails with [`RasterError::Borrow`] while a [`Context`] still targets the
    /// surface.
    pub fn from_surface(surface: &mut ImageSurface) -> Result<Self, RasterError> {
        if surface.format() != Format::ARgb32 {
            let mut converted = convert_to_argb32(surface)?;
            return Self::from_surface(&mut converted);
        }

        surface.flush();
        let width = surface.width();
        let height = surface.height();
        if width <= 0 || height <= 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        let stride = surface.stride();
        let data = surface.data()?.to_vec();

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Decodes a PNG byte stream.
    pub fn from_png(bytes: &[u8]) -> Result<Self, RasterError> {
        let mut decoded = ImageSurface::create_from_png(&mut Cursor::new(bytes))?;
        Self::from_surface(&mut decoded)
    }

    /// Builds a new Cairo surface holding a copy of these pixels.
    pub fn to_surface(&self) -> Result<ImageSurface, RasterError> {
        Ok(ImageSurface::create_for_data(
            self.data.clone(),
            Format::ARgb32,
            self.width,
            self.height,
            self.stride,
        )?)
    }

    /// Encodes the image as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let surface = self.to_surface()?;
        let mut buffer = Vec::new();
        surface.write_to_png(&mut buffer)?;
        Ok(buffer)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Raw pixel value at `(x, y)` (`0xAARRGGBB`, premultiplied).
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.stride + x * 4) as usize;
        let bytes: [u8; 4] = self.data[offset..offset + 4].try_into().ok()?;
        Some(u32::from_ne_bytes(bytes))
    }

    /// Alpha channel at `(x, y)`.
    pub fn alpha(&self, x: i32, y: i32) -> Option<u8> {
        self.pixel(x, y).map(|px| (px >> 24) as u8)
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        (0..self.height).all(|y| (0..self.width).all(|x| self.alpha(x, y) == Some(0)))
    }
}

fn convert_to_argb32(surface: &ImageSurface) -> Result<ImageSurface, RasterError> {
    let target = ImageSurface::create(Format::ARgb32, surface.width(), surface.height())?;
    {
        let ctx = Context::new(&target)?;
        ctx.set_source_surface(surface, 0.0, 0.0)?;
        ctx.paint()?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: i32, height: i32, rgba: (f64, f64, f64, f64)) -> RasterImage {
        let mut surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            ctx.set_source_rgba(rgba.0, rgba.1, rgba.2, rgba.3);
            ctx.paint().unwrap();
        }
        RasterImage::from_surface(&mut surface).unwrap()
    }

    #[test]
    fn transparent_image_is_blank() {
        let image = RasterImage::transparent(8, 4).unwrap();
        assert!(image.is_blank());
        assert_eq!(image.alpha(7, 3), Some(0));
        assert_eq!(image.alpha(8, 0), None);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        assert!(matches!(
            RasterImage::transparent(0, 10),
            Err(RasterError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn png_encoding_preserves_pixels() {
        let image = filled(6, 3, (1.0, 0.0, 0.0, 1.0));
        let png = image.to_png().unwrap();
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

        let decoded = RasterImage::from_png(&png).unwrap();
        assert_eq!(decoded.width(), 6);
        assert_eq!(decoded.height(), 3);
        assert_eq!(decoded.pixel(2, 1), Some(0xFFFF_0000));
    }

    #[test]
    fn from_surface_fails_while_context_alive() {
        let mut surface = ImageSurface::create(Format::ARgb32, 2, 2).unwrap();
        let ctx = Context::new(&surface).unwrap();
        assert!(matches!(
            RasterImage::from_surface(&mut surface),
            Err(RasterError::Borrow(_))
        ));
        drop(ctx);
        assert!(RasterImage::from_surface(&mut surface).is_ok());
    }
}
