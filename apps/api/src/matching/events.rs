//! Match Trigger — fire-and-forget hand-off from project request upload to matching.
//!
//! Uploaded → Dispatched → {Completed, Failed}
//!
//! The upload handler calls `MatchEventPublisher::publish`, which pushes onto an
//! unbounded channel and returns immediately. A single worker task drains the channel.
//! Each event runs in its own spawned task so that an error or a panic inside the
//! matching service is logged against the request id and never reaches the uploader.
//! There is no retry, no dead letter and no completion signal back to the publisher.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::matching::service::{MatchSummary, MatchingService};

/// Published once per upload (or rematch request). Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequestUploaded {
    pub project_request_id: i64,
    pub customer_name: String,
}

impl ProjectRequestUploaded {
    pub fn new(project_request_id: i64, customer_name: impl Into<String>) -> Self {
        Self {
            project_request_id,
            customer_name: customer_name.into(),
        }
    }
}

/// Terminal state of one dispatched match run.
#[derive(Debug)]
pub enum MatchRunOutcome {
    Completed(MatchSummary),
    Failed { error: String },
}

/// Publishing side of the trigger. Cheap to clone; carried in `AppState`.
#[derive(Clone)]
pub struct MatchEventPublisher {
    tx: mpsc::UnboundedSender<ProjectRequestUploaded>,
}

impl MatchEventPublisher {
    /// Hands the event to the worker without waiting. Never fails the caller:
    /// if the worker is gone the event is dropped with a warning.
    pub fn publish(&self, event: ProjectRequestUploaded) {
        let id = event.project_request_id;
        match self.tx.send(event) {
            Ok(()) => debug!(project_request_id = id, "Match run dispatched"),
            Err(_) => warn!(
                project_request_id = id,
                "Match worker is not running, dropping uploaded event"
            ),
        }
    }
}

pub fn match_event_channel() -> (
    MatchEventPublisher,
    mpsc::UnboundedReceiver<ProjectRequestUploaded>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MatchEventPublisher { tx }, rx)
}

/// Starts the background consumer. It exits when every publisher has been dropped.
pub fn spawn_match_worker(
    mut rx: mpsc::UnboundedReceiver<ProjectRequestUploaded>,
    service: Arc<dyn MatchingService>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Match worker started");
        while let Some(event) = rx.recv().await {
            let id = event.project_request_id;
            let service = Arc::clone(&service);
            let run = tokio::spawn(async move { handle_uploaded_event(service.as_ref(), event).await });
            if let Err(join_error) = run.await {
                error!(project_request_id = id, "Match run aborted: {join_error}");
            }
        }
        info!("Match event channel closed, worker stopping");
    })
}

/// Runs matching for one event and logs the outcome. Errors stop here.
pub async fn handle_uploaded_event(
    service: &dyn MatchingService,
    event: ProjectRequestUploaded,
) -> MatchRunOutcome {
    let id = event.project_request_id;
    info!(
        project_request_id = id,
        customer = %event.customer_name,
        "Matching consultants for uploaded project request"
    );

    match service.on_project_request_uploaded(id).await {
        Ok(summary) => {
            info!(
                project_request_id = id,
                candidates_scored = summary.candidates_scored,
                matches_stored = summary.matches_stored,
                "Match run completed"
            );
            MatchRunOutcome::Completed(summary)
        }
        Err(e) => {
            error!(
                project_request_id = id,
                code = e.code(),
                "Match run failed: {e}"
            );
            MatchRunOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
