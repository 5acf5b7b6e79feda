//! Webhook endpoint: label an issue as soon as GitHub reports it.
//!
//! The labeler (rules, default label, tracker) is built once at startup and
//! handed to every request through axum state. Each event runs the blocking
//! labeling path on a blocking thread.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::labeler::Labeler;
use crate::report::Reporter;
use crate::sources::{Issue, IssueTracker};

/// The parts of an `issues` event payload the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub action: Option<String>,
    pub issue: Issue,
}

pub fn router<T, P>(labeler: Arc<Labeler<T, P>>) -> Router
where
    T: IssueTracker + Send + Sync + 'static,
    P: Reporter + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/hook", post(hook::<T, P>))
        .with_state(labeler)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve<T, P>(labeler: Arc<Labeler<T, P>>, addr: &str) -> Result<()>
where
    T: IssueTracker + Send + Sync + 'static,
    P: Reporter + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Webhook(format!("failed to bind {addr}: {e}")))?;
    info!(addr, repo = %labeler.config().repo, "webhook listening");
    axum::serve(listener, router(labeler)).await?;
    Ok(())
}

async fn index() -> &'static str {
    "labelbot: POST GitHub issue events to /hook to label new issues.\n"
}

async fn hook<T, P>(State(labeler): State<Arc<Labeler<T, P>>>, body: Bytes) -> StatusCode
where
    T: IssueTracker + Send + Sync + 'static,
    P: Reporter + 'static,
{
    let event: IssueEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "ignoring payload that is not an issue event");
            return StatusCode::BAD_REQUEST;
        }
    };

    let number = event.issue.number;
    debug!(issue = number, action = ?event.action, "received issue event");

    let result = tokio::task::spawn_blocking(move || labeler.label_issue(event.issue, 0)).await;
    match result {
        Ok(Ok(Some(outcome))) if outcome.success => {
            info!(issue = number, "labeled issue from webhook");
        }
        Ok(Ok(Some(outcome))) => {
            warn!(issue = number, status = outcome.status, "webhook label update failed");
        }
        Ok(Ok(None)) => {
            debug!(issue = number, "issue already labeled");
        }
        Ok(Err(e)) => {
            warn!(issue = number, error = %e, "failed to label issue");
        }
        Err(e) => {
            warn!(issue = number, error = %e, "labeling task panicked");
        }
    }

    StatusCode::OK
}
