//! Global hotkey frontend with a local record/stop toggle.
//!
//! Registers CTRL+SHIFT+R (toggle recording) and CTRL+SHIFT+Q (quit) and
//! forwards the matching controls to the controller context over an async
//! channel.

use crate::{AppError, AppResult, ToggleState, UiControl};

use std::{
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Global hotkey handler with a record/stop toggle.
pub struct HotkeyHandler {
    record_id: u32,
    quit_id: u32,
    state: Arc<Mutex<ToggleState>>,
    control_tx: mpsc::Sender<UiControl>,
}

impl HotkeyHandler {
    /// Register the global hotkeys.
    ///
    /// Must be called on a thread with a message pump (e.g. the main
    /// thread running the `tao` event loop) so that `WM_HOTKEY` messages
    /// are dispatched on Windows. The returned [`GlobalHotKeyManager`]
    /// must be kept alive on that thread for the hotkeys to remain
    /// registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkeys() -> AppResult<(GlobalHotKeyManager, u32, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let record = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyR);
        let quit = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyQ);

        manager
            .register(record)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+R: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(quit)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Q: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            record = "CTRL+SHIFT+R",
            quit = "CTRL+SHIFT+Q",
            "Global hotkeys registered"
        );

        Ok((manager, record.id(), quit.id()))
    }

    /// Create a handler for previously registered hotkeys.
    ///
    /// The ids should come from [`register_hotkeys`](Self::register_hotkeys).
    /// This struct is `Send` and can live on any thread; it only listens
    /// on the global [`GlobalHotKeyEvent`] channel.
    pub fn new(record_id: u32, quit_id: u32, control_tx: mpsc::Sender<UiControl>) -> Self {
        Self {
            record_id,
            quit_id,
            state: Arc::new(Mutex::new(ToggleState::Idle)),
            control_tx,
        }
    }

    /// Run the hotkey handler event loop until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // which has blocking recv() -- zero polling, instant response, one
        // thread.
        //
        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    // Every hotkey fires a press and a release event; only
                    // the press toggles.
                    if event.state != HotKeyState::Pressed {
                        continue;
                    }
                    if event.id == self.record_id {
                        self.handle_record_toggle().await?;
                    } else if event.id == self.quit_id {
                        info!("Quit hotkey pressed");
                        self.control_tx.send(UiControl::Quit).await.map_err(|e| {
                            AppError::ChannelSendFailed {
                                message: format!("Failed to send Quit: {}", e),
                                location: ErrorLocation::from(Location::caller()),
                            }
                        })?;
                    }
                }
            }
        }

        // Drop event_rx to unblock the blocking task's next blocking_send().
        drop(event_rx);

        // Best-effort join: the blocking task may be stuck in recv() if no
        // hotkey event arrives after shutdown. Use a timeout to avoid
        // hanging; the task is cleaned up by the runtime on process exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_record_toggle(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;

        match *state {
            ToggleState::Idle => {
                // Send first -- if this fails, the belief stays Idle and
                // the user can simply press the hotkey again.
                self.control_tx.send(UiControl::Start).await.map_err(|e| {
                    AppError::ChannelSendFailed {
                        message: format!("Failed to send Start: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;

                // Only update the belief AFTER the control was delivered.
                *state = ToggleState::Recording {
                    started_at: Instant::now(),
                };

                info!("Start control sent");
            }
            ToggleState::Recording { started_at } => {
                self.control_tx.send(UiControl::Stop).await.map_err(|e| {
                    AppError::ChannelSendFailed {
                        message: format!("Failed to send Stop: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;

                *state = ToggleState::Idle;

                info!(
                    duration_ms = started_at.elapsed().as_millis(),
                    "Stop control sent"
                );
            }
        }

        Ok(())
    }
}
