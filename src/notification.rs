//! User-facing notifications for export outcomes.

use std::collections::HashMap;

use async_trait::async_trait;
use zbus::{Connection, proxy};

/// D-Bus interface for freedesktop Notifications.
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Returns the notification id.
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Urgency of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    fn icon(self) -> &'static str {
        match self {
            NotificationKind::Info => "camera-photo",
            NotificationKind::Warning => "dialog-warning",
            NotificationKind::Error => "dialog-error",
        }
    }
}

/// Receives human-readable messages about finished exports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, kind: NotificationKind, summary: &str, body: &str);
}

/// Sends freedesktop notifications over the session bus.
///
/// Delivery failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    timeout_ms: i32,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            app_name: "Overscribe".to_string(),
            timeout_ms: 3000,
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, kind: NotificationKind, summary: &str, body: &str) {
        if let Err(e) = send_notification(&self.app_name, kind, summary, body, self.timeout_ms).await
        {
            log::warn!("Failed to send notification: {}", e);
        }
    }
}

/// Writes notifications to the log. Used headless and in the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, kind: NotificationKind, summary: &str, body: &str) {
        match kind {
            NotificationKind::Info => log::info!("{}: {}", summary, body),
            NotificationKind::Warning => log::warn!("{}: {}", summary, body),
            NotificationKind::Error => log::error!("{}: {}", summary, body),
        }
    }
}

async fn send_notification(
    app_name: &str,
    kind: NotificationKind,
    summary: &str,
    body: &str,
    timeout_ms: i32,
) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session bus: {}", e))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

    proxy
        .notify(
            app_name,
            0,
            kind.icon(),
            summary,
            body,
            vec![],
            HashMap::new(),
            timeout_ms,
        )
        .await
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}
