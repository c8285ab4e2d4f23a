//! Annotated screenshot export.
//!
//! An export takes a snapshot of the view under the overlay (with transient
//! chrome filtered out), composites the annotation frame on top and hands
//! the PNG to its consumers:
//! - file save with a timestamped name
//! - the Wayland clipboard (probed first)
//! - an embedder callback receiving the raw bytes
//!
//! When no snapshot can be had the export degrades to the annotation layer
//! alone instead of failing.

pub mod clipboard;
pub mod compositor;
pub mod file;
pub mod portal;
pub mod types;

mod dependencies;
mod manager;
mod pipeline;
mod sources;

pub use dependencies::{
    DefaultFileSaver, ExclusionFilter, ExportClipboard, ExportDependencies, ExportFileSaver,
    SceneElement, SnapshotRequest, SnapshotSource, SystemClipboard, Viewport, chrome_filter,
};
pub use file::FileSaveConfig;
pub use manager::ExportManager;
pub use pipeline::{BytesCallback, ExportRequest};
pub use sources::{FileSnapshotSource, LayeredSnapshotSource, PortalSnapshotSource, SceneLayer};
pub use types::{ExportDestination, ExportError, ExportOutcome, ExportResult, ExportStatus};
