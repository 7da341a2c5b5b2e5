//! Debounced background pushes.
//!
//! Each [`Autosaver::schedule`] call replaces the queued record and restarts
//! the quiescence window; only when the window elapses with no newer record
//! does the latest one get pushed. A burst of edits becomes one remote write.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{SaveRecord, SaveReconciler};

#[derive(Debug)]
struct AutosaveRequest {
    profile_id: String,
    record: SaveRecord,
}

/// Handle to the debounce task. Dropping it stops accepting work; call
/// [`Autosaver::shutdown`] to flush a queued record first.
#[derive(Debug)]
pub struct Autosaver {
    tx: mpsc::UnboundedSender<AutosaveRequest>,
    reconciler: SaveReconciler,
    task: JoinHandle<()>,
}

impl Autosaver {
    /// Spawn the debounce task on the current tokio runtime.
    pub fn spawn(reconciler: SaveReconciler, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, reconciler.clone(), window));
        Self {
            tx,
            reconciler,
            task,
        }
    }

    /// Queue `record` for a push once edits go quiet.
    ///
    /// The save is marked pending right away; a successful push clears it.
    pub fn schedule(&self, profile_id: &str, record: SaveRecord) {
        self.reconciler.mark_pending();
        let request = AutosaveRequest {
            profile_id: profile_id.to_string(),
            record,
        };
        if self.tx.send(request).is_err() {
            warn!("autosave task is gone; save stays pending");
        }
    }

    /// Stop the task, pushing any queued record immediately.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "autosave task ended abnormally");
        }
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<AutosaveRequest>, reconciler: SaveReconciler, window: Duration) {
    let mut queued: Option<AutosaveRequest> = None;
    loop {
        match queued.take() {
            None => match rx.recv().await {
                Some(request) => queued = Some(request),
                None => break,
            },
            Some(request) => {
                tokio::select! {
                    next = rx.recv() => match next {
                        Some(newer) => {
                            debug!("autosave window restarted");
                            queued = Some(newer);
                        }
                        None => {
                            flush(&reconciler, request).await;
                            break;
                        }
                    },
                    _ = tokio::time::sleep(window) => flush(&reconciler, request).await,
                }
            }
        }
    }
}

async fn flush(reconciler: &SaveReconciler, request: AutosaveRequest) {
    // push() logs and sets the pending flag on failure
    if reconciler
        .push(&request.profile_id, &request.record)
        .await
        .is_ok()
    {
        debug!(profile_id = %request.profile_id, "autosave pushed");
    }
}
