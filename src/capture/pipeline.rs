use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use crate::capture::{
    compositor,
    dependencies::{
        ExclusionFilter, ExportClipboard, ExportDependencies, ExportFileSaver, SnapshotRequest,
        Viewport,
    },
    file::FileSaveConfig,
    types::{ExportDestination, ExportError, ExportResult},
};
use crate::draw::RasterImage;
use tokio::task;

/// Receives the encoded PNG of every successful export.
pub type BytesCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// One export: the rendered annotation frame plus where the composite goes.
#[derive(Clone)]
pub struct ExportRequest {
    /// Annotation frame in device pixels.
    pub annotations: RasterImage,
    pub viewport: Viewport,
    pub exclude: ExclusionFilter,
    pub destination: ExportDestination,
    pub save_config: Option<FileSaveConfig>,
    pub snapshot_timeout: Duration,
    pub on_bytes: Option<BytesCallback>,
}

impl fmt::Debug for ExportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportRequest")
            .field("annotations", &self.annotations)
            .field("viewport", &self.viewport)
            .field("destination", &self.destination)
            .field(
                "save_config",
                &self
                    .save_config
                    .as_ref()
                    .map(|cfg| cfg.filename_template.clone()),
            )
            .field("snapshot_timeout", &self.snapshot_timeout)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn perform_export(
    request: ExportRequest,
    dependencies: Arc<ExportDependencies>,
) -> Result<ExportResult, ExportError> {
    log::info!(
        "Starting export: {:?} ({}x{} device px)",
        request.destination,
        request.annotations.width(),
        request.annotations.height()
    );

    // Probe before doing any work when the clipboard is the only consumer.
    let clipboard_available = request.destination.wants_clipboard()
        && probe_clipboard(Arc::clone(&dependencies.clipboard)).await;
    if request.destination == ExportDestination::ClipboardOnly && !clipboard_available {
        return Err(ExportError::ClipboardUnsupported);
    }

    // Stage 1: background snapshot, bounded by the timeout.
    let snapshot_request = SnapshotRequest {
        viewport: request.viewport,
        exclude: Arc::clone(&request.exclude),
    };
    let background = match tokio::time::timeout(
        request.snapshot_timeout,
        dependencies.source.snapshot(&snapshot_request),
    )
    .await
    {
        Ok(Ok(image)) => {
            log::debug!("Snapshot acquired: {:?}", image);
            Some(image)
        }
        Ok(Err(err)) => {
            log::warn!("Snapshot failed ({}); exporting annotations only", err);
            None
        }
        Err(_) => {
            log::warn!(
                "{}; exporting annotations only",
                ExportError::SnapshotTimeout(request.snapshot_timeout)
            );
            None
        }
    };

    // Stage 2: composite and encode off the async workers.
    let annotations = request.annotations;
    let (image_data, width, height, degraded) = task::spawn_blocking(move || {
        let (composite, degraded) = composite_or_degrade(background.as_ref(), &annotations)?;
        let png = composite.to_png()?;
        Ok::<_, ExportError>((png, composite.width(), composite.height(), degraded))
    })
    .await
    .map_err(|e| ExportError::ImageError(format!("Compositor task failed: {}", e)))??;

    log::debug!("Encoded composite: {} bytes", image_data.len());

    if let Some(on_bytes) = &request.on_bytes {
        on_bytes(&image_data);
    }

    let saved_path = match (request.destination.wants_file(), request.save_config) {
        (true, Some(save_config)) if !save_config.save_directory.as_os_str().is_empty() => Some(
            save_image(
                Arc::clone(&dependencies.saver),
                image_data.clone(),
                save_config,
            )
            .await?,
        ),
        _ => None,
    };

    let copied_to_clipboard = match request.destination {
        ExportDestination::ClipboardOnly => {
            copy_to_clipboard(Arc::clone(&dependencies.clipboard), image_data.clone()).await?;
            true
        }
        ExportDestination::ClipboardAndFile if clipboard_available => {
            match copy_to_clipboard(Arc::clone(&dependencies.clipboard), image_data.clone()).await
            {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Failed to copy to clipboard: {}", e);
                    false
                }
            }
        }
        ExportDestination::ClipboardAndFile => {
            log::warn!("Clipboard image copy unsupported; saved to file only");
            false
        }
        ExportDestination::FileOnly | ExportDestination::BytesOnly => false,
    };

    Ok(ExportResult {
        image_data,
        width,
        height,
        saved_path,
        copied_to_clipboard,
        degraded,
    })
}

/// Composites over `background`, falling back to the annotation layer alone
/// when there is no background or it cannot be drawn. The flag reports the
/// fallback.
fn composite_or_degrade(
    background: Option<&RasterImage>,
    annotations: &RasterImage,
) -> Result<(RasterImage, bool), ExportError> {
    if let Some(background) = background {
        match compositor::compose(Some(background), annotations) {
            Ok(composite) => return Ok((composite, false)),
            Err(e) => log::warn!(
                "Could not draw snapshot {:?} ({}); exporting annotations only",
                background,
                e
            ),
        }
    }
    Ok((compositor::compose(None, annotations)?, true))
}

async fn probe_clipboard(clipboard: Arc<dyn ExportClipboard>) -> bool {
    task::spawn_blocking(move || clipboard.is_available())
        .await
        .unwrap_or(false)
}

async fn save_image(
    saver: Arc<dyn ExportFileSaver>,
    image_data: Vec<u8>,
    config: FileSaveConfig,
) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || saver.save(&image_data, &config))
        .await
        .map_err(|e| ExportError::ImageError(format!("Save task failed: {}", e)))?
}

async fn copy_to_clipboard(
    clipboard: Arc<dyn ExportClipboard>,
    image_data: Vec<u8>,
) -> Result<(), ExportError> {
    task::spawn_blocking(move || clipboard.copy(&image_data))
        .await
        .map_err(|e| ExportError::ClipboardError(format!("Clipboard task failed: {}", e)))??;
    log::info!("Copied export to clipboard");
    Ok(())
}
