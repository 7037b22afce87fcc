//! Deskcast: hotkey-driven screen recording with native save dialogs.

mod config;
mod controller;
mod error;
mod host;
mod host_request;
mod hotkey_handler;
mod main_command;
mod media_type;
mod notifier;
mod persistence;
#[cfg(test)]
mod tests;
mod toggle_state;
mod ui_control;
mod ui_event;

pub(crate) use {
    controller::Controller,
    error::{AppError, Result as AppResult},
    host::Host,
    host_request::HostRequest,
    hotkey_handler::HotkeyHandler,
    main_command::MainCommand,
    toggle_state::ToggleState,
    ui_control::UiControl,
    ui_event::UiEvent,
};

use crate::config::Config;

use deskcast_core::{CaptureEngine, CaptureSession};
use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("deskcast=debug,deskcast_core=debug")
        .init();

    let event_loop = EventLoopBuilder::<MainCommand>::with_user_event().build();
    let main_proxy = event_loop.create_proxy();

    // Persists across event loop iterations -- dropping it unregisters the
    // hotkeys.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(MainCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let engine = match CaptureEngine::new() {
                    Ok(engine) => engine,
                    Err(e) => {
                        error!("Failed to initialize capture engine: {:?}", e);
                        std::process::exit(1);
                    }
                };

                // Register hotkeys on the main thread -- tao's event loop
                // pumps the Windows messages needed for WM_HOTKEY delivery.
                let (manager, record_id, quit_id) = match HotkeyHandler::register_hotkeys() {
                    Ok(triple) => triple,
                    Err(e) => {
                        error!("Failed to register hotkeys: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let (request_tx, request_rx) = mpsc::channel(32);
                let (event_tx, event_rx) = mpsc::channel(32);
                let (control_tx, control_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let main_proxy = main_proxy.clone();

                // Spawn the tokio runtime on a separate thread. The main
                // thread keeps pumping the event loop for hotkey delivery.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let hotkey_handler = HotkeyHandler::new(record_id, quit_id, control_tx);

                        let host = Host {
                            config,
                            event_tx,
                            request_rx,
                        };

                        let controller = Controller {
                            session: CaptureSession::new(),
                            engine,
                            settings: None,
                            sources: Vec::new(),
                            auto_select_primary: true,
                            recording_id: None,
                            host_tx: request_tx,
                            control_rx,
                            event_rx,
                            shutdown_tx,
                            main_proxy,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = host.run().await {
                                    error!(error = ?e, "Host context error");
                                }
                            },
                            async {
                                if let Err(e) = controller.run().await {
                                    error!(error = ?e, "Controller context error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
