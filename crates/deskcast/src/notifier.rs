//! Desktop toast notifications for pipeline outcomes.

use notify_rust::Notification;
use tracing::{debug, warn};

/// Application name shown on toasts.
const APP_NAME: &str = "Deskcast";

/// Show a desktop toast without blocking the calling task.
///
/// Notification backends can stall on a busy session bus, so the call runs
/// on the blocking pool. Failures are logged, never propagated: a missed
/// toast must not fail the pipeline.
pub(crate) fn toast(summary: &str, body: &str) {
    let summary = summary.to_string();
    let body = body.to_string();
    let _ = tokio::task::spawn_blocking(move || {
        match Notification::new()
            .appname(APP_NAME)
            .summary(&summary)
            .body(&body)
            .show()
        {
            Ok(_) => debug!(summary = %summary, "Toast shown"),
            Err(e) => warn!(error = %e, "Failed to show toast"),
        }
    });
}
