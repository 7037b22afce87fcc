//! Live stream handles and the control block shared with capture workers.

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};
use std::thread::JoinHandle;

use tracing::{debug, error, info};

/// Ordered chunk buffer shared between a recording stream and its session.
pub(crate) type SharedChunks = Arc<Mutex<Vec<Vec<u8>>>>;

/// Lock a mutex, recovering from poison.
///
/// A poisoned mutex means a previous holder panicked, but the buffered
/// data is still valid and must not be silently dropped.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("Lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

/// Control block shared between an acquired stream and its capture worker.
pub(crate) struct StreamCtrl {
    /// Signals the worker to stop capturing and drain the encoder. Set on
    /// release and as a backstop on drop.
    pub(crate) shutdown: AtomicBool,
    /// Flips the worker from preview-drain into encoding mode.
    pub(crate) recording: AtomicBool,
    /// Chunk sink, installed before `recording` is set.
    pub(crate) sink: Mutex<Option<SharedChunks>>,
}

impl StreamCtrl {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            shutdown: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            sink: Mutex::new(None),
        })
    }
}

/// A live, exclusively owned media stream attached to a capture source.
///
/// The stream starts in preview mode: frames are drained but nothing is
/// persisted. `start_recording` installs the chunk sink and switches the
/// worker into encoding mode; `release` stops capture and joins the worker
/// so that every emitted chunk has landed in the sink before it returns.
pub struct AcquiredStream {
    pub(crate) ctrl: Arc<StreamCtrl>,
    pub(crate) worker: Option<JoinHandle<()>>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl AcquiredStream {
    /// Frame dimensions reported by the first captured frame.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Begin recording: encoded chunks start flowing into `sink` in
    /// emission order.
    pub(crate) fn start_recording(&self, sink: SharedChunks) {
        // Install the sink before flipping the flag. The worker reads
        // `recording` with Acquire and only then takes the sink, so it can
        // never observe the flag without the sink in place.
        *lock_or_recover(&self.ctrl.sink) = Some(sink);
        self.ctrl.recording.store(true, Ordering::Release);
        info!("Stream switched into recording mode");
    }

    /// Stop capture and join the worker.
    ///
    /// Blocks until the encoder has been drained, which guarantees the
    /// chunk sink is complete when this returns. Idempotent.
    pub(crate) fn release(&mut self) {
        self.ctrl.shutdown.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Capture worker panicked during release");
            } else {
                debug!("Capture worker joined");
            }
        }
    }
}

impl Drop for AcquiredStream {
    fn drop(&mut self) {
        // Backstop only: a dropped handle must never keep capturing the
        // user's screen. Normal paths go through `release` and join.
        self.ctrl.shutdown.store(true, Ordering::Release);
    }
}
