//! The capture-session state machine.
//!
//! One session is active per running instance. Illegal transitions are
//! rejected here by construction, not by collaborators disabling controls:
//! `start` is a no-op outside `Streaming` and `stop` is a no-op outside
//! `Recording`.

use crate::capture::recording::Recording;
use crate::capture::stream::{AcquiredStream, SharedChunks, lock_or_recover};

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument, warn};

/// Capture session states, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No source chosen, no stream held. Initial and terminal state.
    Idle,
    /// A source id has been chosen; acquisition is in flight.
    SourceSelected,
    /// A live stream is attached; recording may start.
    Streaming,
    /// Chunks are accumulating in the buffer.
    Recording,
    /// Chunks have been concatenated into a payload awaiting persistence.
    Finalizing,
    /// The persistence round-trip reported success.
    Saved,
    /// The persistence round-trip was cancelled or failed.
    SaveFailed,
}

/// The capture-session state machine and its chunk buffer.
///
/// Exclusively owns the single live stream handle for its lifetime; the
/// stream is released on every exit path, including error paths, so a live
/// capture of the user's screen can never leak.
pub struct CaptureSession {
    pub(crate) state: SessionState,
    pub(crate) source_id: Option<String>,
    pub(crate) stream: Option<AcquiredStream>,
    pub(crate) chunks: SharedChunks,
}

impl CaptureSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            source_id: None,
            stream: None,
            chunks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Chosen source id, if any.
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Choose a capture source.
    ///
    /// Legal from `Idle`, `SourceSelected`, and `Streaming`; while
    /// `Streaming` the prior selection is silently replaced and its stream
    /// released. Ignored once recording has begun.
    #[instrument(skip(self))]
    pub fn select_source(&mut self, id: &str) -> bool {
        match self.state {
            SessionState::Idle | SessionState::SourceSelected | SessionState::Streaming => {
                self.release_stream();
                self.source_id = Some(id.to_string());
                self.state = SessionState::SourceSelected;
                info!(source_id = id, "Source selected");
                true
            }
            _ => {
                debug!(state = ?self.state, "Ignoring source selection");
                false
            }
        }
    }

    /// Attach a successfully acquired stream.
    ///
    /// Transitions `SourceSelected -> Streaming`. An attach in any other
    /// state releases the stream immediately: a late acquisition racing a
    /// reset must not leak a live capture.
    #[instrument(skip(self, stream))]
    pub fn attach_stream(&mut self, mut stream: AcquiredStream) -> bool {
        if self.state != SessionState::SourceSelected {
            warn!(state = ?self.state, "Discarding stream attached out of order");
            stream.release();
            return false;
        }
        let (width, height) = stream.dimensions();
        self.stream = Some(stream);
        self.state = SessionState::Streaming;
        info!(width, height, "Stream attached, preview live");
        true
    }

    /// Record an acquisition failure: back to `Idle`, selection cleared.
    #[instrument(skip(self))]
    pub fn acquisition_failed(&mut self) {
        warn!(source_id = ?self.source_id, "Stream acquisition failed");
        self.reset();
    }

    /// Start recording. No-op unless the state is exactly `Streaming`.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Streaming {
            debug!(state = ?self.state, "Ignoring start outside Streaming");
            return false;
        }
        if let Some(stream) = &self.stream {
            stream.start_recording(Arc::clone(&self.chunks));
        }
        self.state = SessionState::Recording;
        info!("Recording started");
        true
    }

    /// Stop recording and finalize.
    ///
    /// No-op (`None`) unless the state is exactly `Recording`. Otherwise
    /// the stream is released (joining its workers, so every emitted chunk
    /// has landed), the chunks are concatenated in emission order into a
    /// single payload tagged with `media_type`, and the buffer is cleared.
    /// Irreversible: the per-chunk structure is discarded. The session is
    /// left in `Finalizing` awaiting [`complete`](Self::complete).
    #[instrument(skip(self))]
    pub fn stop(&mut self, media_type: &str) -> Option<Recording> {
        if self.state != SessionState::Recording {
            debug!(state = ?self.state, "Ignoring stop outside Recording");
            return None;
        }
        self.state = SessionState::Finalizing;
        self.release_stream();

        let mut buffer = lock_or_recover(&self.chunks);
        let total: usize = buffer.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in buffer.drain(..) {
            bytes.extend_from_slice(&chunk);
        }
        drop(buffer);

        info!(payload_bytes = total, media_type, "Recording finalized");

        Some(Recording {
            media_type: media_type.to_string(),
            bytes,
        })
    }

    /// Record the persistence outcome. Only meaningful in `Finalizing`.
    #[instrument(skip(self))]
    pub fn complete(&mut self, saved: bool) {
        if self.state != SessionState::Finalizing {
            debug!(state = ?self.state, "Ignoring completion outside Finalizing");
            return;
        }
        self.state = if saved {
            SessionState::Saved
        } else {
            SessionState::SaveFailed
        };
        info!(saved, "Save round-trip completed");
    }

    /// Return to `Idle`, releasing the stream and clearing the buffer.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.release_stream();
        lock_or_recover(&self.chunks).clear();
        self.source_id = None;
        self.state = SessionState::Idle;
        debug!("Session reset");
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}
