use crate::capture::stream::{AcquiredStream, StreamCtrl, lock_or_recover};

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn detached_stream() -> AcquiredStream {
    AcquiredStream {
        ctrl: StreamCtrl::new(),
        worker: None,
        width: 1920,
        height: 1080,
    }
}

/// WHAT: start_recording installs the sink before the recording flag flips
/// WHY: The worker must never observe the flag without a sink to write to
#[test]
#[allow(clippy::unwrap_used)]
fn given_stream_when_recording_started_then_sink_installed_and_flag_set() {
    // Given: A preview-mode stream and an empty shared buffer
    let stream = detached_stream();
    let sink = Arc::new(Mutex::new(Vec::new()));
    assert!(!stream.ctrl.recording.load(Ordering::Acquire));

    // When: Switching into recording mode
    stream.start_recording(Arc::clone(&sink));

    // Then: The flag is set and the installed sink is the same buffer
    assert!(stream.ctrl.recording.load(Ordering::Acquire));
    let installed = lock_or_recover(&stream.ctrl.sink).take().unwrap();
    assert!(Arc::ptr_eq(&installed, &sink));
}

/// WHAT: Release is idempotent
/// WHY: Replacement, finalization, and reset may all release the same handle
#[test]
fn given_released_stream_when_released_again_then_no_effect() {
    // Given: A released stream
    let mut stream = detached_stream();
    stream.release();
    assert!(stream.ctrl.shutdown.load(Ordering::Acquire));

    // When/Then: Releasing again is harmless
    stream.release();
    assert!(stream.ctrl.shutdown.load(Ordering::Acquire));
}

/// WHAT: Dropping a stream signals its worker to shut down
/// WHY: An abandoned handle must never keep a live capture of the screen
#[test]
fn given_stream_when_dropped_then_shutdown_signalled() {
    // Given: A stream whose control block we keep observing
    let stream = detached_stream();
    let ctrl = Arc::clone(&stream.ctrl);

    // When: The handle is dropped without an explicit release
    drop(stream);

    // Then: The worker was signalled
    assert!(ctrl.shutdown.load(Ordering::Acquire));
}

/// WHAT: Release joins the worker so every chunk has landed in the sink
/// WHY: Finalization reads the buffer right after release; nothing may trail
#[test]
fn given_worker_emitting_chunks_when_released_then_all_chunks_in_order() {
    // Given: A stream whose worker emits 100 ordered chunks, pausing until
    // shutdown is signalled to prove release really waits
    let ctrl = StreamCtrl::new();
    let sink = Arc::new(Mutex::new(Vec::new()));
    let worker = {
        let ctrl = Arc::clone(&ctrl);
        let sink = Arc::clone(&sink);
        std::thread::spawn(move || {
            while !ctrl.shutdown.load(Ordering::Acquire) {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            for i in 0..100u8 {
                lock_or_recover(&sink).push(vec![i]);
            }
        })
    };
    let mut stream = AcquiredStream {
        ctrl,
        worker: Some(worker),
        width: 0,
        height: 0,
    };

    // When: Releasing the stream
    stream.release();

    // Then: All 100 chunks are present in emission order
    let buffer = lock_or_recover(&sink);
    assert_eq!(buffer.len(), 100);
    for (i, chunk) in buffer.iter().enumerate() {
        assert_eq!(chunk, &vec![i as u8]);
    }
}
