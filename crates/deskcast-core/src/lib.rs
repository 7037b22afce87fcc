//! Deskcast Core Library
//!
//! Screen capture pipeline: source enumeration, stream acquisition, the
//! capture-session state machine, and chunk finalization, built on scap
//! frame capture piped through an ffmpeg child process for encoding.
//!
//! # Example
//!
//! ```no_run
//! use deskcast_core::{CaptureEngine, CaptureProfile, CaptureSession, CoreResult};
//!
//! use std::{thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let engine = CaptureEngine::new()?;
//!     let mut session = CaptureSession::new();
//!
//!     let sources = deskcast_core::list_sources();
//!     if let Some(source) = sources.first() {
//!         session.select_source(&source.id);
//!         let profile = CaptureProfile {
//!             media_type: "video/webm".to_string(),
//!             fps: 30,
//!             show_cursor: true,
//!         };
//!         session.attach_stream(engine.acquire(&source.id, &profile)?);
//!         session.start();
//!         sleep(Duration::from_secs(3));
//!         if let Some(recording) = session.stop("video/webm") {
//!             println!("Captured {} bytes", recording.len());
//!         }
//!         session.reset();
//!     }
//!     Ok(())
//! }
//! ```

mod capture;
mod error;

pub use {
    capture::{
        AcquiredStream, CaptureEngine, CaptureProfile, CaptureSession, Recording, SessionState,
        Source, SourceKind, list_sources,
    },
    error::{CaptureError, Result as CoreResult},
};

#[cfg(test)]
mod tests;
