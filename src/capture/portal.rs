//! xdg-desktop-portal integration for background snapshots.

use std::collections::HashMap;

use futures::StreamExt;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{Connection, proxy};

use super::types::ExportError;

/// Portal response codes carried by `Request::Response`.
const RESPONSE_SUCCESS: u32 = 0;
const RESPONSE_CANCELLED: u32 = 1;

#[proxy(
    interface = "org.freedesktop.portal.Screenshot",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Screenshot {
    /// Returns the object path of the `Request` that will carry the result.
    async fn screenshot(
        &self,
        parent_window: &str,
        options: HashMap<String, Value<'_>>,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// Requests a full-output screenshot and waits for the portal's answer.
///
/// Returns the `file://` URI of the written image.
pub async fn capture_via_portal() -> Result<String, ExportError> {
    let connection = Connection::session().await?;
    let screenshot = ScreenshotProxy::new(&connection).await?;

    let request_path = screenshot
        .screenshot("", snapshot_options())
        .await
        .map_err(classify_call_error)?;
    log::debug!("Portal request {:?} pending", request_path);

    let request = RequestProxy::builder(&connection)
        .path(request_path)?
        .build()
        .await?;
    let mut responses = request.receive_response().await?;

    let signal = responses.next().await.ok_or_else(|| {
        ExportError::InvalidResponse("portal closed without a response".to_string())
    })?;
    let args = signal
        .args()
        .map_err(|e| ExportError::InvalidResponse(format!("malformed portal response: {}", e)))?;

    uri_from_response(args.response, &args.results)
}

fn classify_call_error(error: zbus::Error) -> ExportError {
    let message = error.to_string();
    if message.contains("Cancelled") || message.contains("denied") {
        log::warn!("Portal refused the snapshot: {}", message);
        ExportError::PermissionDenied
    } else {
        log::error!("Portal screenshot call failed: {}", message);
        ExportError::DBusError(error)
    }
}

/// Interprets a `Request::Response` payload.
fn uri_from_response(
    code: u32,
    results: &HashMap<String, OwnedValue>,
) -> Result<String, ExportError> {
    match code {
        RESPONSE_SUCCESS => {
            let value = results.get("uri").ok_or_else(|| {
                ExportError::InvalidResponse("portal response has no uri".to_string())
            })?;
            let uri: &str = value.downcast_ref().map_err(|e| {
                ExportError::InvalidResponse(format!("portal uri is not a string: {}", e))
            })?;
            log::debug!("Portal snapshot written to {}", uri);
            Ok(uri.to_string())
        }
        RESPONSE_CANCELLED => Err(ExportError::PermissionDenied),
        other => Err(ExportError::InvalidResponse(format!(
            "portal returned response code {}",
            other
        ))),
    }
}

/// Non-interactive, non-modal: the whole output is captured immediately.
fn snapshot_options() -> HashMap<String, Value<'static>> {
    HashMap::from([
        ("modal".to_string(), Value::from(false)),
        ("interactive".to_string(), Value::from(false)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_options_are_non_interactive() {
        let options = snapshot_options();
        assert_eq!(options.get("interactive"), Some(&Value::from(false)));
        assert_eq!(options.get("modal"), Some(&Value::from(false)));
    }

    #[test]
    fn cancelled_response_is_permission_denied() {
        let err = uri_from_response(RESPONSE_CANCELLED, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ExportError::PermissionDenied));
    }

    #[test]
    fn success_without_uri_is_invalid() {
        let err = uri_from_response(RESPONSE_SUCCESS, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidResponse(_)));
    }

    #[test]
    fn success_returns_uri() {
        let uri = OwnedValue::try_from(Value::from("file:///tmp/shot.png")).unwrap();
        let results = HashMap::from([("uri".to_string(), uri)]);
        assert_eq!(
            uri_from_response(RESPONSE_SUCCESS, &results).unwrap(),
            "file:///tmp/shot.png"
        );
    }

    #[test]
    fn other_codes_are_invalid() {
        let err = uri_from_response(2, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidResponse(_)));
    }
}
