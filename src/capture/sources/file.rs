use std::path::PathBuf;

use async_trait::async_trait;
use tokio::task;

use crate::capture::{
    dependencies::{SnapshotRequest, SnapshotSource},
    types::ExportError,
};
use crate::draw::RasterImage;

/// Uses a PNG on disk as the background.
///
/// The image is taken to contain application content only, so the
/// exclusion filter has nothing to act on.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn snapshot(&self, _request: &SnapshotRequest) -> Result<RasterImage, ExportError> {
        let path = self.path.clone();
        task::spawn_blocking(move || -> Result<RasterImage, ExportError> {
            log::debug!("Loading snapshot from {}", path.display());
            let bytes = std::fs::read(&path).map_err(|e| {
                ExportError::SnapshotUnavailable(format!("{}: {}", path.display(), e))
            })?;
            Ok(RasterImage::from_png(&bytes)?)
        })
        .await
        .map_err(|e| ExportError::ImageError(format!("Snapshot reader task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::dependencies::{Viewport, chrome_filter};

    fn request() -> SnapshotRequest {
        SnapshotRequest {
            viewport: Viewport::new(4, 4, 1.0),
            exclude: chrome_filter(),
        }
    }

    #[tokio::test]
    async fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let png = RasterImage::transparent(3, 2).unwrap().to_png().unwrap();
        std::fs::write(&path, png).unwrap();

        let image = FileSnapshotSource::new(&path)
            .snapshot(&request())
            .await
            .unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSnapshotSource::new(dir.path().join("missing.png"))
            .snapshot(&request())
            .await;
        assert!(matches!(result, Err(ExportError::SnapshotUnavailable(_))));
    }
}
