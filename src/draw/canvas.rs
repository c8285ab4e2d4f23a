//! Device-pixel render target for the annotation layer.

use cairo::{Context, Format, ImageSurface};

use super::font::FontDescriptor;
use super::raster::{RasterError, RasterImage};
use super::render::{Scene, render_scene};

/// The annotation layer's backing surface.
///
/// Scenes are described in logical coordinates; the canvas owns a buffer of
/// `ceil(logical × scale)` device pixels and applies the scale when rendering.
#[derive(Debug)]
pub struct Canvas {
    surface: ImageSurface,
    logical_width: u32,
    logical_height: u32,
    scale: f64,
}

impl Canvas {
    /// Creates a transparent canvas for a `width`×`height` logical viewport.
    pub fn new(width: u32, height: u32, scale: f64) -> Result<Self, RasterError> {
        let scale = sanitize_scale(scale);
        let (device_width, device_height) = device_dimensions(width, height, scale);
        let surface = ImageSurface::create(Format::ARgb32, device_width, device_height)?;
        Ok(Self {
            surface,
            logical_width: width,
            logical_height: height,
            scale,
        })
    }

    /// Reallocates the buffer after a viewport or scale change.
    ///
    /// The previous contents are dropped; callers re-render afterwards.
    pub fn resize(&mut self, width: u32, height: u32, scale: f64) -> Result<(), RasterError> {
        let scale = sanitize_scale(scale);
        if width == self.logical_width && height == self.logical_height && scale == self.scale {
            return Ok(());
        }

        log::debug!(
            "Resizing canvas {}x{}@{} -> {}x{}@{}",
            self.logical_width,
            self.logical_height,
            self.scale,
            width,
            height,
            scale
        );
        *self = Self::new(width, height, scale)?;
        Ok(())
    }

    /// Replays `scene` into the buffer.
    pub fn render(&mut self, scene: &Scene<'_>, font: &FontDescriptor) -> Result<(), RasterError> {
        {
            let ctx = Context::new(&self.surface)?;
            ctx.scale(self.scale, self.scale);
            render_scene(&ctx, scene, font);
        }
        self.surface.flush();
        Ok(())
    }

    /// Copies the current frame out as a thread-safe raster.
    pub fn snapshot(&mut self) -> Result<RasterImage, RasterError> {
        RasterImage::from_surface(&mut self.surface)
    }

    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    /// Buffer size in device pixels.
    pub fn device_size(&self) -> (i32, i32) {
        (self.surface.width(), self.surface.height())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        log::warn!("Invalid device scale {}; using 1.0", scale);
        1.0
    }
}

/// Device buffer size for a logical viewport, never smaller than 1×1.
pub fn device_dimensions(width: u32, height: u32, scale: f64) -> (i32, i32) {
    let scaled = |value: u32| ((value as f64 * scale).ceil() as i32).max(1);
    (scaled(width), scaled(height))
}
