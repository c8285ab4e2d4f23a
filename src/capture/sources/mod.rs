//! Snapshot sources for the export background.

mod file;
mod layered;
mod portal;
pub(crate) mod reader;

pub use file::FileSnapshotSource;
pub use layered::{LayeredSnapshotSource, SceneLayer};
pub use portal::PortalSnapshotSource;
