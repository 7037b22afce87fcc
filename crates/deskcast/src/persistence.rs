//! Persistence gateway: native save dialog plus durable write.

use crate::{AppError, AppResult};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::Utc;
use error_location::ErrorLocation;
use rfd::FileDialog;
use tracing::{info, instrument};

/// Outcome of a save round-trip that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The payload was written and fsynced to the chosen path.
    Written {
        /// The path the user chose.
        path: PathBuf,
    },
    /// The user dismissed the save dialog; nothing was written.
    Cancelled,
}

/// Present the native save dialog and write the finalized payload.
///
/// The dialog is pre-filled with `screen-capture-<unix-epoch-ms>.<ext>`.
/// Cancellation is a non-error (`SaveOutcome::Cancelled`); a failed write
/// is a distinct error, never reported as success.
#[instrument(skip(bytes), fields(payload_bytes = bytes.len()))]
pub(crate) async fn save_recording(
    bytes: Vec<u8>,
    extension: &'static str,
) -> AppResult<SaveOutcome> {
    // Native dialogs block; keep them off the async host loop.
    let chosen = tokio::task::spawn_blocking(move || {
        let default_name = format!(
            "screen-capture-{}.{}",
            Utc::now().timestamp_millis(),
            extension
        );
        FileDialog::new()
            .add_filter(extension, &[extension])
            .set_file_name(default_name)
            .save_file()
    })
    .await
    .map_err(|e| AppError::DialogFailed {
        reason: format!("Save dialog task panicked: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let Some(path) = chosen else {
        info!("Save dialog cancelled, nothing written");
        return Ok(SaveOutcome::Cancelled);
    };

    let write_path = path.clone();
    tokio::task::spawn_blocking(move || write_payload(&write_path, &bytes))
        .await
        .map_err(|e| AppError::WriteFailed {
            path: path.clone(),
            source: std::io::Error::other(format!("write task panicked: {}", e)),
            location: ErrorLocation::from(Location::caller()),
        })??;

    info!(path = ?path, "Recording saved");

    Ok(SaveOutcome::Written { path })
}

/// Write the payload and fsync it before reporting success.
#[track_caller]
pub(crate) fn write_payload(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let mut file = fs::File::create(path).map_err(|e| AppError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
        location: ErrorLocation::from(Location::caller()),
    })?;

    file.write_all(bytes).map_err(|e| AppError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
        location: ErrorLocation::from(Location::caller()),
    })?;

    file.sync_all().map_err(|e| AppError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(())
}
