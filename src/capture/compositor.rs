//! Composites a background snapshot with the annotation layer.

use cairo::{Context, Format, ImageSurface};

use crate::draw::{RasterError, RasterImage};

/// Builds the export image.
///
/// The output has the size of `annotations` (the device-pixel buffer). The
/// background, when present, is scaled to fill it; the annotation layer is
/// painted on top at the origin without scaling. With no background the
/// result is the annotation layer over transparency.
pub fn compose(
    background: Option<&RasterImage>,
    annotations: &RasterImage,
) -> Result<RasterImage, RasterError> {
    let width = annotations.width();
    let height = annotations.height();

    let mut target = ImageSurface::create(Format::ARgb32, width, height)?;
    {
        let ctx = Context::new(&target)?;
        if let Some(background) = background {
            paint_scaled(&ctx, background, width, height)?;
        }

        let overlay = annotations.to_surface()?;
        ctx.set_source_surface(&overlay, 0.0, 0.0)?;
        ctx.paint()?;
    }

    RasterImage::from_surface(&mut target)
}

/// Paints `image` stretched over a `width` x `height` device area.
pub fn paint_scaled(
    ctx: &Context,
    image: &RasterImage,
    width: i32,
    height: i32,
) -> Result<(), RasterError> {
    if image.width() <= 0 || image.height() <= 0 {
        return Err(RasterError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }
    let source = image.to_surface()?;
    let sx = f64::from(width) / f64::from(image.width());
    let sy = f64::from(height) / f64::from(image.height());

    // Pad so the scaled edges do not fade into transparency.
    let pattern = cairo::SurfacePattern::create(&source);
    pattern.set_filter(cairo::Filter::Good);
    pattern.set_extend(cairo::Extend::Pad);

    ctx.save()?;
    ctx.scale(sx, sy);
    ctx.set_source(&pattern)?;
    ctx.paint()?;
    ctx.restore()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: i32, height: i32, rgba: (f64, f64, f64, f64)) -> RasterImage {
        let mut surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            ctx.set_source_rgba(rgba.0, rgba.1, rgba.2, rgba.3);
            ctx.paint().unwrap();
        }
        RasterImage::from_surface(&mut surface).unwrap()
    }

    fn dot(width: i32, height: i32, x: f64, y: f64) -> RasterImage {
        let mut surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            ctx.set_source_rgb(1.0, 0.0, 0.0);
            ctx.rectangle(x, y, 2.0, 2.0);
            ctx.fill().unwrap();
        }
        RasterImage::from_surface(&mut surface).unwrap()
    }

    #[test]
    fn output_matches_annotation_size() {
        let background = solid(10, 10, (0.0, 0.0, 1.0, 1.0));
        let annotations = dot(40, 30, 0.0, 0.0);

        let composite = compose(Some(&background), &annotations).unwrap();
        assert_eq!((composite.width(), composite.height()), (40, 30));
    }

    #[test]
    fn background_fills_and_annotations_sit_on_top() {
        let background = solid(10, 10, (0.0, 0.0, 1.0, 1.0));
        let annotations = dot(40, 30, 20.0, 10.0);

        let composite = compose(Some(&background), &annotations).unwrap();

        // Scaled background reaches the far corner, fully opaque.
        assert_eq!(composite.alpha(39, 29), Some(255));
        // Red dot over blue background.
        assert_eq!(composite.pixel(20, 10), Some(0xFFFF0000));
        assert_eq!(composite.pixel(5, 5), Some(0xFF0000FF));
    }

    #[test]
    fn without_background_only_annotations_remain() {
        let annotations = dot(20, 20, 4.0, 4.0);

        let composite = compose(None, &annotations).unwrap();

        assert!(!composite.is_blank());
        assert_eq!(composite.alpha(0, 0), Some(0));
        assert_eq!(composite.pixel(4, 4), Some(0xFFFF0000));
    }

    #[test]
    fn undrawable_background_is_an_error() {
        // Wider than cairo's maximum surface dimension.
        let background = RasterImage::transparent(40_000, 1).unwrap();
        let annotations = dot(20, 20, 4.0, 4.0);

        assert!(compose(Some(&background), &annotations).is_err());
    }
}
