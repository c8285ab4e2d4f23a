//! Data types for annotated screenshot export.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::draw::RasterError;

/// Where the exported image should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDestination {
    ClipboardOnly,
    FileOnly,
    ClipboardAndFile,
    /// Encode only; the bytes go to the embedder callback and the result.
    BytesOnly,
}

impl ExportDestination {
    pub fn wants_file(self) -> bool {
        matches!(
            self,
            ExportDestination::FileOnly | ExportDestination::ClipboardAndFile
        )
    }

    pub fn wants_clipboard(self) -> bool {
        matches!(
            self,
            ExportDestination::ClipboardOnly | ExportDestination::ClipboardAndFile
        )
    }
}

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Encoded PNG bytes of the composite.
    pub image_data: Vec<u8>,
    /// Composite size in device pixels.
    pub width: i32,
    pub height: i32,
    /// Path where the image was saved (if saved).
    pub saved_path: Option<PathBuf>,
    /// Whether the image was copied to the clipboard.
    pub copied_to_clipboard: bool,
    /// True when the background snapshot was unavailable and the export
    /// holds the annotation layer alone.
    pub degraded: bool,
}

impl ExportResult {
    /// Human-readable summary used for notifications.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(path) = &self.saved_path {
            parts.push(format!("Saved to {}", path.display()));
        }
        if self.copied_to_clipboard {
            parts.push("Copied to clipboard".to_string());
        }
        if parts.is_empty() {
            parts.push(format!("Exported {}x{} image", self.width, self.height));
        }
        let mut message = parts.join(". ");
        if self.degraded {
            message.push_str(" (screenshot unavailable, annotations only)");
        }
        message
    }
}

/// Outcome of an export request (success or failure).
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Success(ExportResult),
    Failed(String),
}

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Screenshot unavailable: {0}")]
    SnapshotUnavailable(String),

    #[error("Screenshot timed out after {0:?}")]
    SnapshotTimeout(Duration),

    #[error("Screenshot permission denied by user")]
    PermissionDenied,

    #[error("D-Bus communication error: {0}")]
    DBusError(#[from] zbus::Error),

    #[error("Portal returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to save export: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Clipboard image copy is not supported on this system")]
    ClipboardUnsupported,

    #[error("Clipboard operation failed: {0}")]
    ClipboardError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("An export is already in progress")]
    Busy,

    #[error("Export manager not running")]
    NotRunning,
}

/// Status of the export manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    InProgress,
    /// Last export completed with the screenshot background.
    Success,
    /// Last export completed without the screenshot background.
    Degraded,
    Failed(String),
}
