use async_trait::async_trait;
use tokio::task;

use crate::capture::{
    dependencies::{SnapshotRequest, SnapshotSource},
    portal,
    types::ExportError,
};
use crate::draw::RasterImage;

use super::reader::read_image_from_uri;

/// Full-output screenshot through xdg-desktop-portal.
///
/// The portal captures whatever is on screen. It cannot apply the exclusion
/// filter, so the host must unmap its chrome before requesting an export.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortalSnapshotSource;

#[async_trait]
impl SnapshotSource for PortalSnapshotSource {
    async fn snapshot(&self, request: &SnapshotRequest) -> Result<RasterImage, ExportError> {
        log::debug!("Portal snapshot for {:?}", request.viewport);
        let uri = portal::capture_via_portal().await?;
        log::info!("Portal returned URI: {}", uri);

        task::spawn_blocking(move || -> Result<RasterImage, ExportError> {
            let bytes = read_image_from_uri(&uri)?;
            Ok(RasterImage::from_png(&bytes)?)
        })
        .await
        .map_err(|e| ExportError::ImageError(format!("Portal reader task failed: {}", e)))?
    }
}
