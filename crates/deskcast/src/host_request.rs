use crate::{AppResult, config::Config, persistence::SaveOutcome};

use deskcast_core::Recording;
use tokio::sync::oneshot;

/// Requests sent from the controller context to the privileged host.
///
/// `SaveRecording` and `SaveSettings` are request/response pairs carrying a
/// oneshot reply sender; ordering within one pair is guaranteed by its
/// channel. `RefreshSources` is fire-and-forget.
#[derive(Debug)]
pub enum HostRequest {
    /// Persist a finalized recording via the native save dialog.
    SaveRecording {
        /// The finalized payload to write.
        recording: Recording,
        /// Resolves with the save outcome, or a distinct write failure.
        reply: oneshot::Sender<AppResult<SaveOutcome>>,
    },
    /// Validate and persist a full settings record (not a partial patch).
    SaveSettings {
        /// The record to persist.
        config: Config,
        /// Resolves `true` only after confirmed persistence.
        reply: oneshot::Sender<bool>,
    },
    /// Re-enumerate capture sources and push a fresh `SourcesAvailable`.
    RefreshSources,
}
