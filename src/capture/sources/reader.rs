use std::path::{Path, PathBuf};
use std::{fs, thread, time::Duration};

use crate::capture::types::ExportError;

/// Retry budget for files the portal has not finished writing (3s total).
const READ_ATTEMPTS: u32 = 60;
const READ_DELAY: Duration = Duration::from_millis(50);

/// Reads the image behind a portal `file://` URI, then deletes the file.
pub fn read_image_from_uri(uri: &str) -> Result<Vec<u8>, ExportError> {
    let path = path_from_uri(uri)?;
    let data = read_when_ready(&path)?;
    log::debug!("Read {} bytes from {}", data.len(), path.display());

    if let Err(e) = fs::remove_file(&path) {
        log::warn!("Failed to remove portal file {}: {}", path.display(), e);
    }
    Ok(data)
}

fn path_from_uri(uri: &str) -> Result<PathBuf, ExportError> {
    let url = url::Url::parse(uri)
        .map_err(|e| ExportError::InvalidResponse(format!("invalid file URI '{}': {}", uri, e)))?;
    url.to_file_path()
        .map_err(|_| ExportError::InvalidResponse(format!("not a local file URI: {}", uri)))
}

/// Portals may announce the URI before the file is flushed, so a missing or
/// empty file is polled until it has content.
fn read_when_ready(path: &Path) -> Result<Vec<u8>, ExportError> {
    for attempt in 1..=READ_ATTEMPTS {
        match fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
            Ok(_) => log::trace!("{} still empty (attempt {})", path.display(), attempt),
            Err(e) => log::trace!("{} not readable yet (attempt {}): {}", path.display(), attempt, e),
        }
        if attempt < READ_ATTEMPTS {
            thread::sleep(READ_DELAY);
        }
    }
    Err(ExportError::ImageError(format!(
        "portal file {} not ready after {} attempts",
        path.display(),
        READ_ATTEMPTS
    )))
}
