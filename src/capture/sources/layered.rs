use std::sync::Arc;

use async_trait::async_trait;
use cairo::{Context, Format, ImageSurface};
use tokio::task;

use crate::capture::{
    compositor::paint_scaled,
    dependencies::{SceneElement, SnapshotRequest, SnapshotSource},
    types::ExportError,
};
use crate::draw::RasterImage;

/// One host-rendered layer with its scene role.
#[derive(Debug, Clone)]
pub struct SceneLayer {
    pub element: SceneElement,
    pub image: RasterImage,
}

impl SceneLayer {
    pub fn new(element: SceneElement, image: RasterImage) -> Self {
        Self { element, image }
    }
}

/// Flattens host-provided layers, bottom to top, skipping every layer the
/// exclusion filter rejects.
#[derive(Debug, Clone, Default)]
pub struct LayeredSnapshotSource {
    layers: Arc<Vec<SceneLayer>>,
}

impl LayeredSnapshotSource {
    pub fn new(layers: Vec<SceneLayer>) -> Self {
        Self {
            layers: Arc::new(layers),
        }
    }
}

#[async_trait]
impl SnapshotSource for LayeredSnapshotSource {
    async fn snapshot(&self, request: &SnapshotRequest) -> Result<RasterImage, ExportError> {
        let layers = Arc::clone(&self.layers);
        let request = request.clone();

        task::spawn_blocking(move || -> Result<RasterImage, ExportError> {
            let (width, height) = request.viewport.device_size();
            let kept: Vec<&SceneLayer> = layers
                .iter()
                .filter(|layer| {
                    let excluded = (request.exclude)(&layer.element);
                    if excluded {
                        log::trace!("Snapshot skips {:?} layer", layer.element);
                    }
                    !excluded
                })
                .collect();

            if kept.is_empty() {
                return Err(ExportError::SnapshotUnavailable(
                    "no visible layers after filtering".to_string(),
                ));
            }

            let mut target = ImageSurface::create(Format::ARgb32, width, height)
                .map_err(crate::draw::RasterError::from)?;
            {
                let ctx = Context::new(&target).map_err(crate::draw::RasterError::from)?;
                for layer in kept {
                    paint_scaled(&ctx, &layer.image, width, height)?;
                }
            }
            Ok(RasterImage::from_surface(&mut target)?)
        })
        .await
        .map_err(|e| ExportError::ImageError(format!("Layer flatten task failed: {}", e)))?
    }
}
