//! Clipboard integration for copying exported images.

use super::types::ExportError;
use std::process::{Command, Stdio};
use wl_clipboard_rs::copy::{MimeType, Options, Source};

/// Copy PNG bytes to the Wayland clipboard.
///
/// Prefers the `wl-copy` command; falls back to `wl-clipboard-rs` when the
/// command is missing or fails.
pub fn copy_to_clipboard(image_data: &[u8]) -> Result<(), ExportError> {
    log::debug!("Copying {} bytes of PNG to the clipboard", image_data.len());

    let command_err = match copy_via_command(image_data) {
        Ok(()) => {
            log::info!("Copied export via wl-copy");
            return Ok(());
        }
        Err(e) => e,
    };
    log::warn!("wl-copy unusable ({}), trying wl-clipboard-rs", command_err);

    copy_via_library(image_data)
        .map(|()| log::info!("Copied export via wl-clipboard-rs"))
        .map_err(|library_err| {
            ExportError::ClipboardError(format!(
                "wl-copy: {}; wl-clipboard-rs: {}",
                command_err, library_err
            ))
        })
}

fn copy_via_library(image_data: &[u8]) -> Result<(), ExportError> {
    use wl_clipboard_rs::copy::ServeRequests;

    let mut opts = Options::new();
    // Serve one paste then exit
    opts.serve_requests(ServeRequests::Only(1));

    opts.copy(
        Source::Bytes(image_data.into()),
        MimeType::Specific("image/png".to_string()),
    )
    .map_err(|e| ExportError::ClipboardError(format!("wl-clipboard-rs error: {}", e)))?;

    Ok(())
}

fn copy_via_command(image_data: &[u8]) -> Result<(), ExportError> {
    use std::io::Write;

    let mut child = Command::new("wl-copy")
        .arg("--type")
        .arg("image/png")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ExportError::ClipboardError(format!(
                "Failed to spawn wl-copy (is it installed?): {}",
                e
            ))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(image_data).map_err(|e| {
            ExportError::ClipboardError(format!("Failed to write to wl-copy stdin: {}", e))
        })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ExportError::ClipboardError(format!("Failed to wait for wl-copy: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExportError::ClipboardError(format!(
            "wl-copy failed: {}",
            stderr
        )));
    }

    Ok(())
}

/// Probes whether image clipboard writes can work here.
///
/// True when `wl-copy` runs, or when a Wayland display is reachable for
/// the library fallback.
pub fn is_clipboard_available() -> bool {
    let command_ok = Command::new("wl-copy")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());

    command_ok || std::env::var_os("WAYLAND_DISPLAY").is_some()
}
