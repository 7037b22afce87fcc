//! Privileged host context: settings store and persistence gateway.

use crate::{
    AppError, AppResult, HostRequest, UiEvent,
    config::Config,
    media_type,
    persistence::{self, SaveOutcome},
};

use std::panic::Location;

use deskcast_core::{Recording, list_sources};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// The privileged context task.
///
/// Owns the single durable `Config` and the persistence gateway. The
/// controller's settings mirror is only ever updated through `UiEvent`
/// pushes, and only after a write has been confirmed durable, so runtime
/// state never drifts ahead of the durable record.
pub struct Host {
    pub(crate) config: Config,
    pub(crate) event_tx: mpsc::Sender<UiEvent>,
    pub(crate) request_rx: mpsc::Receiver<HostRequest>,
}

impl Host {
    /// Run the host context until the request channel closes.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        self.push_sources().await;
        let _ = self
            .event_tx
            .send(UiEvent::SettingsSnapshot(self.config.clone()))
            .await;
        info!("Host context ready");

        while let Some(request) = self.request_rx.recv().await {
            self.handle_request(request).await;
        }

        info!("Host context shut down");
        Ok(())
    }

    async fn handle_request(&mut self, request: HostRequest) {
        match request {
            HostRequest::SaveRecording { recording, reply } => {
                let outcome = self.save_recording(recording).await;
                if reply.send(outcome).is_err() {
                    warn!("Save requester went away before the outcome arrived");
                }
            }
            HostRequest::SaveSettings { config, reply } => {
                let saved = self.save_settings(config).await;
                let _ = reply.send(saved);
            }
            HostRequest::RefreshSources => self.push_sources().await,
        }
    }

    /// Derive the extension from the configured format and run the save
    /// dialog round-trip.
    #[instrument(skip(self, recording), fields(payload_bytes = recording.len()))]
    async fn save_recording(&self, recording: Recording) -> AppResult<SaveOutcome> {
        // Config is validated at load and save time, so a miss here means
        // the durable record was edited out from under us.
        let extension = media_type::extension_for(&self.config.output.file_type).ok_or_else(
            || AppError::UnknownFileType {
                file_type: self.config.output.file_type.clone(),
                location: ErrorLocation::from(Location::caller()),
            },
        )?;

        if recording.media_type != self.config.output.file_type {
            warn!(
                tagged = %recording.media_type,
                configured = %self.config.output.file_type,
                "Recording was encoded before a settings update; extension follows current settings"
            );
        }

        persistence::save_recording(recording.bytes, extension).await
    }

    /// Validate and persist a full settings record, then mirror it.
    ///
    /// Returns `false` on any failure, leaving every in-memory copy
    /// untouched.
    #[instrument(skip(self, config))]
    async fn save_settings(&mut self, config: Config) -> bool {
        if let Err(e) = config.validate() {
            error!(error = %e, "Rejecting settings with unmapped file type");
            return false;
        }

        let to_persist = config.clone();
        match tokio::task::spawn_blocking(move || to_persist.save()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "Failed to persist settings");
                return false;
            }
            Err(e) => {
                error!(error = %e, "Settings persist task panicked");
                return false;
            }
        }

        // Mirror only after confirmed persistence.
        self.config = config.clone();
        let _ = self.event_tx.send(UiEvent::SettingsUpdated(config)).await;
        info!("Settings updated and mirrored");
        true
    }

    /// Enumerate sources and push them to the controller.
    async fn push_sources(&self) {
        let sources = match tokio::task::spawn_blocking(list_sources).await {
            Ok(sources) => sources,
            Err(e) => {
                error!(error = %e, "Source enumeration task panicked");
                Vec::new()
            }
        };
        // An empty list is a valid outcome; the frontend renders it as
        // "no sources available".
        let _ = self.event_tx.send(UiEvent::SourcesAvailable(sources)).await;
    }
}
