use crate::capture::stream::{AcquiredStream, StreamCtrl, lock_or_recover};
use crate::{CaptureSession, SessionState};

use std::sync::Arc;
use std::sync::atomic::Ordering;

fn test_stream() -> AcquiredStream {
    AcquiredStream {
        ctrl: StreamCtrl::new(),
        worker: None,
        width: 1280,
        height: 720,
    }
}

fn streaming_session() -> CaptureSession {
    let mut session = CaptureSession::new();
    session.select_source("screen:0");
    session.attach_stream(test_stream());
    session
}

/// WHAT: Selecting an enumerated id walks the session to Streaming
/// WHY: The selection-to-preview path is the entry of the whole pipeline
#[test]
fn given_idle_session_when_source_selected_and_stream_attached_then_streaming() {
    // Given: An idle session
    let mut session = CaptureSession::new();
    assert_eq!(session.state(), SessionState::Idle);

    // When: Selecting a source and attaching the acquired stream
    assert!(session.select_source("w1"));
    assert_eq!(session.state(), SessionState::SourceSelected);
    assert_eq!(session.source_id(), Some("w1"));
    assert!(session.attach_stream(test_stream()));

    // Then: The session is streaming with the selection intact
    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(session.source_id(), Some("w1"));
}

/// WHAT: Start is a no-op in every state except Streaming
/// WHY: Illegal transitions must be rejected by construction, not by UI
#[test]
fn given_non_streaming_states_when_start_invoked_then_no_op() {
    // Given: An idle session
    let mut session = CaptureSession::new();

    // When/Then: Start is rejected from Idle
    assert!(!session.start());
    assert_eq!(session.state(), SessionState::Idle);

    // When/Then: Start is rejected while acquisition is in flight
    session.select_source("screen:0");
    assert!(!session.start());
    assert_eq!(session.state(), SessionState::SourceSelected);

    // When/Then: A second start while recording is rejected, so a second
    // concurrent recording can never begin
    session.attach_stream(test_stream());
    assert!(session.start());
    assert!(!session.start());
    assert_eq!(session.state(), SessionState::Recording);
}

/// WHAT: Stop is a no-op in every state except Recording
/// WHY: Stopping a session that is not recording must not produce a payload
#[test]
fn given_non_recording_states_when_stop_invoked_then_no_op() {
    // Given: An idle session
    let mut session = CaptureSession::new();

    // When/Then: Stop yields nothing from Idle and from Streaming
    assert!(session.stop("video/webm").is_none());
    session.select_source("screen:0");
    session.attach_stream(test_stream());
    assert!(session.stop("video/webm").is_none());
    assert_eq!(session.state(), SessionState::Streaming);
}

/// WHAT: Re-selecting while streaming silently replaces the selection
/// WHY: Switching sources is allowed any time before recording starts
#[test]
fn given_streaming_session_when_new_source_selected_then_prior_stream_released() {
    // Given: A streaming session whose stream control block we can observe
    let mut session = CaptureSession::new();
    session.select_source("screen:0");
    let stream = test_stream();
    let ctrl = Arc::clone(&stream.ctrl);
    session.attach_stream(stream);

    // When: Selecting a different source
    assert!(session.select_source("window:7"));

    // Then: The old stream was released and the new selection is pending
    assert!(ctrl.shutdown.load(Ordering::Acquire));
    assert_eq!(session.state(), SessionState::SourceSelected);
    assert_eq!(session.source_id(), Some("window:7"));
}

/// WHAT: Selection is ignored once recording has begun
/// WHY: At most one capture session may ever be active per instance
#[test]
fn given_recording_session_when_selecting_source_then_ignored() {
    // Given: A recording session
    let mut session = streaming_session();
    session.start();

    // When: Attempting to switch sources mid-recording
    let accepted = session.select_source("window:9");

    // Then: The selection is rejected and the recording continues
    assert!(!accepted);
    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.source_id(), Some("screen:0"));
}

/// WHAT: A stream attached out of order is released, not leaked
/// WHY: A late acquisition racing a reset must never keep capturing
#[test]
fn given_idle_session_when_stream_attached_then_discarded_and_released() {
    // Given: An idle session and a stray acquired stream
    let mut session = CaptureSession::new();
    let stream = test_stream();
    let ctrl = Arc::clone(&stream.ctrl);

    // When: Attaching without a pending selection
    let accepted = session.attach_stream(stream);

    // Then: The attach is rejected and the stream shut down
    assert!(!accepted);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(ctrl.shutdown.load(Ordering::Acquire));
}

/// WHAT: Finalization concatenates chunks in emission order, byte for byte
/// WHY: The saved payload must be exactly what the media layer emitted
#[test]
#[allow(clippy::unwrap_used)]
fn given_emitted_chunks_when_stopped_then_payload_is_ordered_concatenation() {
    // Given: A recording session with three 1024-byte chunks buffered
    let mut session = streaming_session();
    session.start();
    {
        let mut buffer = lock_or_recover(&session.chunks);
        buffer.push(vec![0u8; 1024]);
        buffer.push(vec![1u8; 1024]);
        buffer.push(vec![2u8; 1024]);
    }

    // When: Stopping the recording
    let recording = session.stop("video/webm");

    // Then: The payload is the 3072-byte ordered concatenation and the
    // chunk buffer is empty immediately after finalization
    let recording = recording.unwrap();
    assert_eq!(recording.media_type, "video/webm");
    assert_eq!(recording.len(), 3072);
    assert!(recording.bytes[..1024].iter().all(|&b| b == 0));
    assert!(recording.bytes[1024..2048].iter().all(|&b| b == 1));
    assert!(recording.bytes[2048..].iter().all(|&b| b == 2));
    assert!(lock_or_recover(&session.chunks).is_empty());
    assert_eq!(session.state(), SessionState::Finalizing);
}

/// WHAT: A zero-chunk recording finalizes into an empty payload
/// WHY: N = 0 is a valid emission count, not an error
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_chunks_when_stopped_then_payload_is_empty() {
    // Given: A recording session with nothing buffered
    let mut session = streaming_session();
    session.start();

    // When: Stopping immediately
    let recording = session.stop("video/mp4");

    // Then: An empty payload tagged with the configured media type
    let recording = recording.unwrap();
    assert!(recording.is_empty());
    assert_eq!(recording.media_type, "video/mp4");
}

/// WHAT: Save outcomes land in the matching terminal state
/// WHY: The UI reports success or failure from the session, not from logs
#[test]
fn given_finalizing_session_when_completed_then_terminal_state_recorded() {
    // Given: A finalized session
    let mut session = streaming_session();
    session.start();
    let _ = session.stop("video/webm");

    // When: The persistence round-trip reports success
    session.complete(true);

    // Then: The session reached Saved
    assert_eq!(session.state(), SessionState::Saved);
}

/// WHAT: A cancelled save leaves the session immediately restartable
/// WHY: Dismissing the dialog must not lock the pipeline in a dead state
#[test]
fn given_cancelled_save_when_reset_then_session_records_again() {
    // Given: A session whose save round-trip was cancelled
    let mut session = streaming_session();
    session.start();
    {
        lock_or_recover(&session.chunks).push(vec![7u8; 64]);
    }
    let _ = session.stop("video/webm");
    session.complete(false);
    assert_eq!(session.state(), SessionState::SaveFailed);

    // When: Resetting and running a fresh selection cycle
    session.reset();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.source_id(), None);
    session.select_source("screen:0");
    session.attach_stream(test_stream());

    // Then: A new recording starts with an empty buffer
    assert!(session.start());
    assert_eq!(session.state(), SessionState::Recording);
    assert!(lock_or_recover(&session.chunks).is_empty());
}

/// WHAT: Acquisition failure returns the session to Idle
/// WHY: A failed stream open recovers to the initial state, not a limbo
#[test]
fn given_pending_acquisition_when_failed_then_back_to_idle() {
    // Given: A session waiting on acquisition
    let mut session = CaptureSession::new();
    session.select_source("window:404");

    // When: Acquisition reports failure
    session.acquisition_failed();

    // Then: The session is idle with no residual selection
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.source_id(), None);
}

/// WHAT: Reset releases the held stream on the error path
/// WHY: A live capture of the user's screen must never outlive its session
#[test]
fn given_streaming_session_when_reset_then_stream_released() {
    // Given: A streaming session
    let mut session = CaptureSession::new();
    session.select_source("screen:0");
    let stream = test_stream();
    let ctrl = Arc::clone(&stream.ctrl);
    session.attach_stream(stream);

    // When: Resetting mid-session
    session.reset();

    // Then: The stream was shut down
    assert!(ctrl.shutdown.load(Ordering::Acquire));
    assert_eq!(session.state(), SessionState::Idle);
}
