//! Controller context: drives the capture-session state machine.
//!
//! Exclusively owns the `CaptureSession` and the platform engine, plus a
//! read-only mirror of the host's settings. All inputs arrive as
//! `UiControl` messages; all privileged work leaves as `HostRequest`s.

use crate::{
    AppError, AppResult, HostRequest, MainCommand, UiControl, UiEvent, config::Config, notifier,
    persistence::SaveOutcome,
};

use deskcast_core::{
    CaptureEngine, CaptureProfile, CaptureSession, SessionState, Source, SourceKind,
};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// The UI-context task.
pub struct Controller {
    pub(crate) session: CaptureSession,
    pub(crate) engine: CaptureEngine,
    /// Settings mirror; `None` until the host's snapshot lands.
    pub(crate) settings: Option<Config>,
    pub(crate) sources: Vec<Source>,
    /// Auto-select the primary display once sources and settings are
    /// known, so the hotkey toggle works without a selection UI.
    pub(crate) auto_select_primary: bool,
    /// Correlation id for the recording in flight.
    pub(crate) recording_id: Option<Uuid>,
    pub(crate) host_tx: mpsc::Sender<HostRequest>,
    pub(crate) control_rx: mpsc::Receiver<UiControl>,
    pub(crate) event_rx: mpsc::Receiver<UiEvent>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) main_proxy: EventLoopProxy<MainCommand>,
}

impl Controller {
    /// Run the controller until quit or until every channel closes.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Controller context ready");

        loop {
            tokio::select! {
                Some(control) = self.control_rx.recv() => {
                    if self.handle_control(control).await {
                        break;
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event).await;
                }
                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // Never exit with a live capture of the user's screen.
        self.session.reset();
        let _ = self.shutdown_tx.send(true);
        let _ = self.main_proxy.send_event(MainCommand::Shutdown);
        info!("Controller context shut down");

        Ok(())
    }

    /// Apply a frontend input. Returns true when the app should shut down.
    async fn handle_control(&mut self, control: UiControl) -> bool {
        match control {
            UiControl::SelectSource(id) => self.select_and_acquire(&id).await,
            UiControl::Start => self.start_recording(),
            UiControl::Stop => self.stop_and_save().await,
            UiControl::UpdateSettings(config) => self.update_settings(config).await,
            UiControl::RefreshSources => {
                if self.host_tx.send(HostRequest::RefreshSources).await.is_err() {
                    warn!("Host context gone, cannot refresh sources");
                }
            }
            UiControl::Quit => {
                info!("Quit requested");
                return true;
            }
        }
        false
    }

    async fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SourcesAvailable(sources) => {
                if sources.is_empty() {
                    info!("No sources available");
                } else {
                    info!(count = sources.len(), "Sources available");
                    for source in &sources {
                        debug!(id = %source.id, name = %source.name, kind = ?source.kind, "Capture source");
                    }
                }
                self.sources = sources;
            }
            UiEvent::SettingsSnapshot(config) => {
                debug!(file_type = %config.output.file_type, "Settings snapshot mirrored");
                self.settings = Some(config);
            }
            UiEvent::SettingsUpdated(config) => {
                info!(file_type = %config.output.file_type, "Settings mirror updated");
                self.settings = Some(config);
            }
        }
        self.maybe_auto_select().await;
    }

    /// Auto-select the primary display once sources and settings are both
    /// known. Only fires from `Idle`, so it never stomps an explicit
    /// selection.
    async fn maybe_auto_select(&mut self) {
        if !self.auto_select_primary
            || self.settings.is_none()
            || self.session.state() != SessionState::Idle
        {
            return;
        }
        let Some(primary) = self
            .sources
            .iter()
            .find(|source| source.kind == SourceKind::Screen)
            .cloned()
        else {
            return;
        };
        info!(id = %primary.id, name = %primary.name, "Auto-selecting primary display");
        self.select_and_acquire(&primary.id).await;
    }

    /// Select a source and acquire its stream.
    ///
    /// Acquisition blocks on the platform, so it runs on the blocking
    /// pool; the session waits in `SourceSelected` meanwhile. Failure is
    /// surfaced as a user-visible toast, not a silent log, and returns the
    /// session to `Idle`.
    #[instrument(skip(self))]
    async fn select_and_acquire(&mut self, id: &str) {
        let Some(profile) = self.capture_profile() else {
            warn!("Settings mirror not yet populated, cannot acquire");
            return;
        };

        if !self.session.select_source(id) {
            return;
        }

        let engine = self.engine.clone();
        let source_id = id.to_string();
        let acquired =
            tokio::task::spawn_blocking(move || engine.acquire(&source_id, &profile)).await;

        match acquired {
            Ok(Ok(stream)) => {
                self.session.attach_stream(stream);
            }
            Ok(Err(e)) => {
                let e = AppError::from(e);
                error!(error = %e, "Stream acquisition failed");
                notifier::toast(
                    "Capture failed",
                    &format!("Could not open the selected source: {}", e),
                );
                self.session.acquisition_failed();
            }
            Err(e) => {
                error!(error = %e, "Acquisition task panicked");
                notifier::toast(
                    "Capture failed",
                    "The capture backend crashed while opening the stream",
                );
                self.session.acquisition_failed();
            }
        }
    }

    fn capture_profile(&self) -> Option<CaptureProfile> {
        self.settings.as_ref().map(|config| CaptureProfile {
            media_type: config.output.file_type.clone(),
            fps: config.capture.fps,
            show_cursor: config.capture.show_cursor,
        })
    }

    /// Start buffering chunks. The session's guard makes this a no-op
    /// outside `Streaming`.
    fn start_recording(&mut self) {
        if self.session.start() {
            let id = Uuid::new_v4();
            self.recording_id = Some(id);
            info!(recording_id = %id, "Recording started");
        } else {
            debug!(state = ?self.session.state(), "Start ignored outside Streaming");
        }
    }

    /// Stop, finalize, and run the save round-trip through the host.
    #[instrument(skip(self))]
    async fn stop_and_save(&mut self) {
        let Some(media_type) = self
            .settings
            .as_ref()
            .map(|config| config.output.file_type.clone())
        else {
            debug!("Stop ignored, no settings mirror");
            return;
        };

        let recording_id = self.recording_id.take();
        let Some(recording) = self.session.stop(&media_type) else {
            debug!(state = ?self.session.state(), "Stop ignored outside Recording");
            return;
        };
        info!(
            recording_id = ?recording_id,
            payload_bytes = recording.len(),
            "Recording finalized"
        );

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = HostRequest::SaveRecording {
            recording,
            reply: reply_tx,
        };
        if self.host_tx.send(request).await.is_err() {
            error!("Host context gone, recording lost");
            notifier::toast(
                "Save failed",
                "The recording could not be handed to the host process",
            );
            self.session.complete(false);
            self.session.reset();
            return;
        }

        match reply_rx.await {
            Ok(Ok(SaveOutcome::Written { path })) => {
                info!(recording_id = ?recording_id, path = ?path, "Recording saved");
                notifier::toast("Recording saved", &format!("Saved to {}", path.display()));
                self.session.complete(true);
            }
            Ok(Ok(SaveOutcome::Cancelled)) => {
                info!(recording_id = ?recording_id, "Save cancelled by user");
                self.session.complete(false);
            }
            Ok(Err(e)) => {
                error!(recording_id = ?recording_id, error = %e, "Save failed");
                notifier::toast("Save failed", &format!("{}", e));
                self.session.complete(false);
            }
            Err(_) => {
                error!("Host dropped the save reply");
                notifier::toast("Save failed", "The host process dropped the save request");
                self.session.complete(false);
            }
        }

        // Terminal outcome recorded; ready for the next recording.
        self.session.reset();
    }

    /// Forward a full settings record to the host and report the outcome.
    ///
    /// The mirror is not touched here: it updates when the host pushes
    /// `SettingsUpdated` after confirmed persistence.
    #[instrument(skip(self, config))]
    async fn update_settings(&mut self, config: Config) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = HostRequest::SaveSettings {
            config,
            reply: reply_tx,
        };
        if self.host_tx.send(request).await.is_err() {
            warn!("Host context gone, settings not saved");
            return;
        }

        match reply_rx.await {
            Ok(true) => debug!("Settings persisted; mirror update arrives separately"),
            Ok(false) => {
                warn!("Settings rejected or persistence failed");
                notifier::toast(
                    "Settings not saved",
                    "The settings could not be validated or persisted",
                );
            }
            Err(_) => warn!("Host dropped the settings reply"),
        }
    }
}
