use error_location::ErrorLocation;
use thiserror::Error;

/// Capture pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screen capture is not available on this platform.
    #[error("Screen capture not supported on this platform {location}")]
    NotSupported {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Screen-recording permission has not been granted.
    #[error("Screen recording permission not granted {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The opaque source id did not resolve against a fresh enumeration.
    #[error("Capture source not found: {id} {location}")]
    SourceNotFound {
        /// The stale or malformed source id.
        id: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The stream could not be opened for the chosen source.
    #[error("Stream acquisition failed: {reason} {location}")]
    AcquisitionFailed {
        /// Description of the acquisition failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder process could not be started or driven.
    #[error("Encoder error: {reason} {location}")]
    EncoderError {
        /// Description of the encoder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The configured media type has no encoder mapping.
    #[error("Unsupported media type: {media_type} {location}")]
    UnsupportedMediaType {
        /// The unrecognized media type identifier.
        media_type: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;
