use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::capture::{
    clipboard,
    file::{self, FileSaveConfig},
    sources::PortalSnapshotSource,
    types::ExportError,
};
use crate::draw::RasterImage;
use crate::draw::canvas::device_dimensions;
use crate::notification::{DesktopNotifier, Notifier};

/// Role of a visual element in the host scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneElement {
    /// The application content being annotated
    Content,
    /// The annotation layer itself (composited separately)
    AnnotationLayer,
    ToolDock,
    Tooltip,
    /// Toast / notification layer
    Notification,
    /// Host-defined element
    Other(String),
}

impl SceneElement {
    /// Transient chrome that must never appear in an export.
    pub fn is_chrome(&self) -> bool {
        matches!(
            self,
            SceneElement::AnnotationLayer
                | SceneElement::ToolDock
                | SceneElement::Tooltip
                | SceneElement::Notification
        )
    }
}

/// Predicate returning `true` for elements the snapshot must leave out.
pub type ExclusionFilter = Arc<dyn Fn(&SceneElement) -> bool + Send + Sync>;

/// Drops every chrome element (see [`SceneElement::is_chrome`]).
pub fn chrome_filter() -> ExclusionFilter {
    Arc::new(|element: &SceneElement| element.is_chrome())
}

/// Logical size and device scale of the annotated view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Size of the annotation layer's buffer in device pixels.
    pub fn device_size(&self) -> (i32, i32) {
        device_dimensions(self.width, self.height, self.scale)
    }
}

/// What a snapshot source is asked to capture.
#[derive(Clone)]
pub struct SnapshotRequest {
    pub viewport: Viewport,
    pub exclude: ExclusionFilter,
}

impl fmt::Debug for SnapshotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotRequest")
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// Abstraction over how the full-viewport background is captured.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self, request: &SnapshotRequest) -> Result<RasterImage, ExportError>;
}

/// Abstraction over file saving for exported images.
pub trait ExportFileSaver: Send + Sync {
    fn save(&self, image_data: &[u8], config: &FileSaveConfig) -> Result<PathBuf, ExportError>;
}

/// Abstraction over copying exported images to the clipboard.
pub trait ExportClipboard: Send + Sync {
    /// Whether image writes are supported here. Probed before copying.
    fn is_available(&self) -> bool;
    fn copy(&self, image_data: &[u8]) -> Result<(), ExportError>;
}

/// Bundle of dependencies used by the export pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct ExportDependencies {
    pub source: Arc<dyn SnapshotSource>,
    pub saver: Arc<dyn ExportFileSaver>,
    pub clipboard: Arc<dyn ExportClipboard>,
    pub notifier: Arc<dyn Notifier>,
}

impl Default for ExportDependencies {
    fn default() -> Self {
        Self {
            source: Arc::new(PortalSnapshotSource),
            saver: Arc::new(DefaultFileSaver),
            clipboard: Arc::new(SystemClipboard),
            notifier: Arc::new(DesktopNotifier::default()),
        }
    }
}

/// Saves through [`file::save_export`].
pub struct DefaultFileSaver;

/// The Wayland clipboard (`wl-copy`, then `wl-clipboard-rs`).
pub struct SystemClipboard;

impl ExportFileSaver for DefaultFileSaver {
    fn save(&self, image_data: &[u8], config: &FileSaveConfig) -> Result<PathBuf, ExportError> {
        file::save_export(image_data, config)
    }
}

impl ExportClipboard for SystemClipboard {
    fn is_available(&self) -> bool {
        clipboard::is_clipboard_available()
    }

    fn copy(&self, image_data: &[u8]) -> Result<(), ExportError> {
        clipboard::copy_to_clipboard(image_data)
    }
}
