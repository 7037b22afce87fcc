//! The platform media layer: scap frame capture piped through an ffmpeg
//! child process whose encoded stdout bytes are the emitted chunks.
//!
//! All scap objects live and die on the capture worker thread; acquisition
//! hands back an [`AcquiredStream`] once the first frame has arrived and
//! the stream dimensions are known.

use crate::{
    CaptureError, CoreResult,
    capture::source,
    capture::stream::{AcquiredStream, SharedChunks, StreamCtrl, lock_or_recover},
};

use std::{
    io::{Read, Write},
    panic::Location,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    sync::{Arc, atomic::Ordering, mpsc},
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use scap::{
    capturer::{Capturer, Options, Resolution},
    frame::{Frame, FrameType},
};
use tracing::{debug, error, info, instrument, warn};

/// How long acquisition waits for the worker to report readiness.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(15);

/// How long the worker waits for the platform to deliver a first frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// Read size for encoder output; each read becomes one emitted chunk.
const CHUNK_READ_SIZE: usize = 64 * 1024;

/// Parameters for stream acquisition.
#[derive(Debug, Clone)]
pub struct CaptureProfile {
    /// Media type the emitted chunks are encoded as.
    pub media_type: String,
    /// Target capture framerate.
    pub fps: u32,
    /// Whether the cursor is included in the captured frames.
    pub show_cursor: bool,
}

/// Encoder and muxer arguments for a recognized media type.
pub(crate) fn encoder_args(media_type: &str) -> Option<&'static [&'static str]> {
    match media_type {
        "video/webm" => Some(&["-c:v", "libvpx", "-deadline", "realtime", "-f", "webm"]),
        // Fragmented mp4: the default moov-at-end layout cannot be
        // streamed through a pipe.
        "video/mp4" => Some(&[
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "frag_keyframe+empty_moov",
            "-f",
            "mp4",
        ]),
        "video/x-matroska" => Some(&[
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-f",
            "matroska",
        ]),
        _ => None,
    }
}

/// Handle to the screen-capture and encoding facility.
#[derive(Debug, Clone)]
pub struct CaptureEngine {
    ffmpeg: PathBuf,
}

impl CaptureEngine {
    /// Create the engine, verifying platform support and that ffmpeg is
    /// runnable.
    ///
    /// # Errors
    ///
    /// Returns an error when screen capture is unsupported on this
    /// platform or ffmpeg is not on `PATH`.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        if !scap::is_supported() {
            return Err(CaptureError::NotSupported {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let ffmpeg = PathBuf::from("ffmpeg");

        Command::new(&ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| CaptureError::EncoderError {
                reason: format!("ffmpeg not runnable: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("CaptureEngine initialized");

        Ok(Self { ffmpeg })
    }

    /// Acquire a live stream for the given opaque source id.
    ///
    /// Blocks until the first frame has arrived (bounded by
    /// [`ACQUIRE_TIMEOUT`]); call from a blocking-friendly context. The
    /// returned stream is in preview mode until
    /// [`CaptureSession::start`](crate::CaptureSession::start) switches it
    /// into recording mode.
    ///
    /// # Errors
    ///
    /// Fails for an unmapped media type, missing screen-recording
    /// permission, a stale or malformed source id, and platform capturer
    /// failures.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn acquire(&self, source_id: &str, profile: &CaptureProfile) -> CoreResult<AcquiredStream> {
        if encoder_args(&profile.media_type).is_none() {
            return Err(CaptureError::UnsupportedMediaType {
                media_type: profile.media_type.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !scap::has_permission() {
            return Err(CaptureError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let ctrl = StreamCtrl::new();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("deskcast-capture".to_string())
            .spawn({
                let ctrl = Arc::clone(&ctrl);
                let source_id = source_id.to_string();
                let profile = profile.clone();
                let ffmpeg = self.ffmpeg.clone();
                move || capture_worker(source_id, profile, ffmpeg, ctrl, ready_tx)
            })
            .map_err(|e| CaptureError::AcquisitionFailed {
                reason: format!("failed to spawn capture worker: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match ready_rx.recv_timeout(ACQUIRE_TIMEOUT) {
            Ok(Ok((width, height))) => {
                info!(source_id, width, height, "Stream acquired, preview live");
                Ok(AcquiredStream {
                    ctrl,
                    worker: Some(worker),
                    width,
                    height,
                })
            }
            Ok(Err(e)) => {
                // The worker reported failure and exited; reap it.
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                // The worker is stuck inside the platform layer. Signal it
                // and detach; it exits on its own once the call returns.
                ctrl.shutdown.store(true, Ordering::Release);
                warn!(source_id, "Timed out waiting for stream readiness");
                Err(CaptureError::AcquisitionFailed {
                    reason: "timed out waiting for the first frame".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}

/// Capture worker entry point. Owns every scap object for the stream's
/// lifetime.
fn capture_worker(
    source_id: String,
    profile: CaptureProfile,
    ffmpeg: PathBuf,
    ctrl: Arc<StreamCtrl>,
    ready_tx: mpsc::Sender<CoreResult<(u32, u32)>>,
) {
    let Some(target) = source::resolve_target(&source_id) else {
        let _ = ready_tx.send(Err(CaptureError::SourceNotFound {
            id: source_id,
            location: ErrorLocation::from(Location::caller()),
        }));
        return;
    };

    let options = Options {
        fps: profile.fps,
        target: Some(target),
        show_cursor: profile.show_cursor,
        show_highlight: false,
        excluded_targets: None,
        output_type: FrameType::BGRAFrame,
        output_resolution: Resolution::Captured,
        ..Default::default()
    };

    let mut capturer = match Capturer::build(options) {
        Ok(capturer) => capturer,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::AcquisitionFailed {
                reason: format!("failed to build capturer: {:?}", e),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }
    };

    capturer.start_capture();

    let (width, height) = match wait_for_first_frame(&mut capturer, &ctrl) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            capturer.stop_capture();
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if ready_tx.send(Ok((width, height))).is_err() {
        // The acquirer gave up; never keep a live capture around.
        capturer.stop_capture();
        return;
    }

    run_capture_loop(capturer, ctrl, profile, ffmpeg, width, height);
}

/// Wait for the platform to deliver the first frame, which validates the
/// stream and reveals its dimensions.
fn wait_for_first_frame(capturer: &mut Capturer, ctrl: &StreamCtrl) -> CoreResult<(u32, u32)> {
    let start = Instant::now();

    while start.elapsed() < FIRST_FRAME_TIMEOUT && !ctrl.shutdown.load(Ordering::Acquire) {
        match capturer.get_next_frame() {
            Ok(frame) => {
                if let Some((width, height, data)) = frame_parts(frame) {
                    debug!(width, height, bytes = data.len(), "First frame arrived");
                    return Ok((width, height));
                }
            }
            Err(_) => thread::sleep(Duration::from_millis(20)),
        }
    }

    Err(CaptureError::AcquisitionFailed {
        reason: "no frame delivered; check screen recording permissions".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

struct EncoderPipe {
    child: Child,
    stdin: ChildStdin,
    reader: thread::JoinHandle<()>,
}

/// Drain frames until shutdown, piping them into the encoder once
/// recording mode is switched on.
fn run_capture_loop(
    mut capturer: Capturer,
    ctrl: Arc<StreamCtrl>,
    profile: CaptureProfile,
    ffmpeg: PathBuf,
    width: u32,
    height: u32,
) {
    let expected_len = width as usize * height as usize * 4;
    let mut encoder: Option<EncoderPipe> = None;
    let mut short_frames: u64 = 0;

    while !ctrl.shutdown.load(Ordering::Acquire) {
        let frame = match capturer.get_next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = ?e, "Frame capture error");
                thread::sleep(Duration::from_millis(10));
                continue;
            }
        };

        let Some((_, _, data)) = frame_parts(frame) else {
            warn!("Unexpected frame type, skipping");
            continue;
        };

        if encoder.is_none() && ctrl.recording.load(Ordering::Acquire) {
            match spawn_encoder(&ffmpeg, &profile, width, height, &ctrl) {
                Ok(pipe) => encoder = Some(pipe),
                Err(e) => {
                    error!(error = %e, "Failed to start encoder, stopping capture");
                    break;
                }
            }
        }

        if let Some(pipe) = encoder.as_mut() {
            // scap occasionally delivers empty or truncated frames; writing
            // one would desync the rawvideo stream.
            if data.len() != expected_len {
                short_frames += 1;
                if short_frames <= 3 {
                    warn!(
                        got = data.len(),
                        expected = expected_len,
                        "Skipping frame with unexpected size"
                    );
                }
                continue;
            }
            if let Err(e) = pipe.stdin.write_all(&data) {
                error!(error = %e, "Encoder rejected frame, stopping capture");
                break;
            }
        }
    }

    capturer.stop_capture();

    if let Some(pipe) = encoder {
        drain_encoder(pipe);
    }

    debug!("Capture worker exited");
}

/// Spawn the ffmpeg child and the reader that turns its stdout into
/// chunks.
fn spawn_encoder(
    ffmpeg: &Path,
    profile: &CaptureProfile,
    width: u32,
    height: u32,
    ctrl: &StreamCtrl,
) -> CoreResult<EncoderPipe> {
    let args = encoder_args(&profile.media_type).ok_or_else(|| CaptureError::UnsupportedMediaType {
        media_type: profile.media_type.clone(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut child = Command::new(ffmpeg)
        .args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgra",
            "-s",
            &format!("{}x{}", width, height),
            "-r",
            &profile.fps.to_string(),
            "-i",
            "pipe:0",
        ])
        .args(args)
        .arg("pipe:1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        // Discard stderr to prevent pipe buffer blocking.
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CaptureError::EncoderError {
            reason: format!("failed to spawn ffmpeg: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let stdin = child.stdin.take().ok_or_else(|| CaptureError::EncoderError {
        reason: "encoder stdin unavailable".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;
    let stdout = child.stdout.take().ok_or_else(|| CaptureError::EncoderError {
        reason: "encoder stdout unavailable".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let sink = lock_or_recover(&ctrl.sink)
        .take()
        .ok_or_else(|| CaptureError::EncoderError {
            reason: "no chunk sink installed".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let reader = thread::Builder::new()
        .name("deskcast-encoder".to_string())
        .spawn(move || read_chunks(stdout, sink))
        .map_err(|e| CaptureError::EncoderError {
            reason: format!("failed to spawn encoder reader: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(media_type = %profile.media_type, width, height, "Encoder started");

    Ok(EncoderPipe {
        child,
        stdin,
        reader,
    })
}

/// Append encoder output to the sink, one read per chunk. Single reader,
/// so emission order is preserved.
fn read_chunks(mut stdout: ChildStdout, sink: SharedChunks) {
    let mut buf = vec![0u8; CHUNK_READ_SIZE];
    loop {
        match stdout.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => lock_or_recover(&sink).push(buf[..n].to_vec()),
            Err(e) => {
                error!(error = %e, "Encoder output read failed");
                break;
            }
        }
    }
    debug!("Encoder output drained");
}

/// Close the encoder's stdin, wait for it to flush its trailer, and join
/// the reader so every chunk has landed in the sink.
fn drain_encoder(pipe: EncoderPipe) {
    let EncoderPipe {
        mut child,
        stdin,
        reader,
    } = pipe;

    drop(stdin);

    match child.wait() {
        Ok(status) if !status.success() => {
            warn!(code = ?status.code(), "Encoder exited with error")
        }
        Ok(_) => {}
        Err(e) => error!(error = %e, "Failed to wait for encoder"),
    }

    if reader.join().is_err() {
        error!("Encoder reader thread panicked");
    }
}

/// Dimensions and pixel data for the frame layouts scap can deliver.
fn frame_parts(frame: Frame) -> Option<(u32, u32, Vec<u8>)> {
    match frame {
        Frame::BGRA(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::BGR0(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::RGB(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::RGBx(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::XBGR(f) => Some((f.width as u32, f.height as u32, f.data)),
        Frame::BGRx(f) => Some((f.width as u32, f.height as u32, f.data)),
        _ => None,
    }
}
