use crate::AppError;
use crate::persistence::write_payload;

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

fn temp_file(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("deskcast-test-{}.{}", Uuid::new_v4(), extension))
}

/// WHAT: A written file contains exactly the finalized payload
/// WHY: The saved recording must be byte-for-byte what was finalized
#[test]
#[allow(clippy::unwrap_used)]
fn given_payload_when_written_then_file_contains_exact_bytes() {
    // Given: A 3072-byte payload built from three ordered 1024-byte chunks
    let mut bytes = Vec::with_capacity(3072);
    bytes.extend(std::iter::repeat(0u8).take(1024));
    bytes.extend(std::iter::repeat(1u8).take(1024));
    bytes.extend(std::iter::repeat(2u8).take(1024));
    let path = temp_file("webm");

    // When: Writing the payload
    let result = write_payload(&path, &bytes);

    // Then: The file holds exactly those 3072 bytes
    assert!(result.is_ok());
    let on_disk = fs::read(&path).unwrap();
    assert_eq!(on_disk, bytes);

    let _ = fs::remove_file(&path);
}

/// WHAT: An empty payload writes an empty file
/// WHY: A zero-chunk recording is valid and must save cleanly
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_payload_when_written_then_empty_file() {
    // Given: An empty payload
    let path = temp_file("mp4");

    // When: Writing it
    let result = write_payload(&path, &[]);

    // Then: The file exists and is empty
    assert!(result.is_ok());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);

    let _ = fs::remove_file(&path);
}

/// WHAT: A failed write surfaces as the distinct WriteFailed error
/// WHY: Write failures must never be reported as success
#[test]
fn given_missing_directory_when_written_then_write_failed_error() {
    // Given: A target inside a directory that does not exist
    let path = std::env::temp_dir()
        .join(format!("deskcast-missing-{}", Uuid::new_v4()))
        .join("capture.webm");

    // When: Writing the payload
    let result = write_payload(&path, &[1, 2, 3]);

    // Then: The distinct failure variant is raised
    assert!(matches!(result, Err(AppError::WriteFailed { .. })));
}
