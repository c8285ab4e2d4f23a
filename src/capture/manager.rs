use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{Mutex, mpsc, oneshot};

use crate::capture::{
    dependencies::ExportDependencies,
    pipeline::{ExportRequest, perform_export},
    types::{ExportError, ExportOutcome, ExportResult, ExportStatus},
};
use crate::notification::NotificationKind;

type Reply = oneshot::Sender<Result<ExportResult, ExportError>>;

struct QueuedExport {
    request: ExportRequest,
    reply: Option<Reply>,
}

/// Clears the in-flight flag when the export finishes, even by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs exports on a tokio task, one at a time.
///
/// A request made while another export is in flight is rejected with
/// [`ExportError::Busy`]; nothing is queued behind it.
#[derive(Clone)]
pub struct ExportManager {
    request_tx: mpsc::UnboundedSender<QueuedExport>,
    in_flight: Arc<AtomicBool>,
    status: Arc<Mutex<ExportStatus>>,
    last_result: Arc<Mutex<Option<ExportOutcome>>>,
}

impl ExportManager {
    /// Spawns the export task on `runtime_handle` with the system
    /// dependencies (portal snapshots, Wayland clipboard, desktop notifications).
    pub fn new(runtime_handle: &tokio::runtime::Handle) -> Self {
        Self::with_dependencies(runtime_handle, ExportDependencies::default())
    }

    pub fn with_dependencies(
        runtime_handle: &tokio::runtime::Handle,
        dependencies: ExportDependencies,
    ) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<QueuedExport>();
        let in_flight = Arc::new(AtomicBool::new(false));
        let status = Arc::new(Mutex::new(ExportStatus::Idle));
        let last_result = Arc::new(Mutex::new(None));
        let dependencies = Arc::new(dependencies);

        let flag = in_flight.clone();
        let status_clone = status.clone();
        let result_clone = last_result.clone();

        runtime_handle.spawn(async move {
            while let Some(QueuedExport { request, reply }) = request_rx.recv().await {
                let guard = InFlightGuard(flag.clone());
                log::debug!("Processing export request: {:?}", request);

                *status_clone.lock().await = ExportStatus::InProgress;

                let result = perform_export(request, dependencies.clone()).await;
                let (status, outcome) = match &result {
                    Ok(export) if export.degraded => (
                        ExportStatus::Degraded,
                        ExportOutcome::Success(export.clone()),
                    ),
                    Ok(export) => (ExportStatus::Success, ExportOutcome::Success(export.clone())),
                    Err(e) => (
                        ExportStatus::Failed(e.to_string()),
                        ExportOutcome::Failed(e.to_string()),
                    ),
                };
                match &result {
                    Ok(export) => log::info!("Export finished: {}", export.describe()),
                    Err(e) => log::error!("Export failed: {}", e),
                }

                *status_clone.lock().await = status;
                *result_clone.lock().await = Some(outcome);

                notify_outcome(&dependencies, &result).await;

                // Free the slot before waking the caller.
                drop(guard);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
        });

        Self {
            request_tx,
            in_flight,
            status,
            last_result,
        }
    }

    /// Queues an export and returns immediately.
    pub fn request_export(&self, request: ExportRequest) -> Result<(), ExportError> {
        self.submit(request, None)
    }

    /// Runs an export and waits for its result.
    pub async fn export(&self, request: ExportRequest) -> Result<ExportResult, ExportError> {
        let (tx, rx) = oneshot::channel();
        self.submit(request, Some(tx))?;
        rx.await.map_err(|_| ExportError::NotRunning)?
    }

    fn submit(&self, request: ExportRequest, reply: Option<Reply>) -> Result<(), ExportError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Export rejected: another export is in flight");
            return Err(ExportError::Busy);
        }

        self.request_tx
            .send(QueuedExport { request, reply })
            .map_err(|_| {
                self.in_flight.store(false, Ordering::Release);
                ExportError::NotRunning
            })
    }

    /// True while an export is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn get_status(&self) -> ExportStatus {
        self.status.lock().await.clone()
    }

    /// Get the result of the last export and clear it.
    pub async fn take_result(&self) -> Option<ExportOutcome> {
        self.last_result.lock().await.take()
    }

    /// Non-blocking variant of [`ExportManager::take_result`].
    pub fn try_take_result(&self) -> Option<ExportOutcome> {
        self.last_result.try_lock().ok().and_then(|mut r| r.take())
    }

    pub async fn reset(&self) {
        *self.status.lock().await = ExportStatus::Idle;
    }
}

async fn notify_outcome(
    dependencies: &ExportDependencies,
    result: &Result<ExportResult, ExportError>,
) {
    let notifier = &dependencies.notifier;
    match result {
        Ok(export) if export.degraded => {
            notifier
                .notify(NotificationKind::Warning, "Annotations exported", &export.describe())
                .await
        }
        Ok(export) => {
            notifier
                .notify(NotificationKind::Info, "Screenshot exported", &export.describe())
                .await
        }
        Err(e) => {
            notifier
                .notify(NotificationKind::Error, "Export failed", &e.to_string())
                .await
        }
    }
}

#[cfg(test)]
impl ExportManager {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<QueuedExport>();
        drop(rx);
        Self {
            request_tx: tx,
            in_flight: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(ExportStatus::Idle)),
            last_result: Arc::new(Mutex::new(None)),
        }
    }
}
