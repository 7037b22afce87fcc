//! Fixed registry mapping output media types to filename extensions.

/// A recognized output media type and its filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
    /// MIME identifier stored in configuration, e.g. `video/webm`.
    pub mime: &'static str,
    /// Filename extension used by the save dialog, without the dot.
    pub extension: &'static str,
}

/// Every output format the persistence gateway can produce.
///
/// Settings whose `file_type` is absent from this table are rejected at
/// load and save time; the table is the single authority for extensions.
pub const MEDIA_TYPES: &[MediaType] = &[
    MediaType {
        mime: "video/webm",
        extension: "webm",
    },
    MediaType {
        mime: "video/mp4",
        extension: "mp4",
    },
    MediaType {
        mime: "video/x-matroska",
        extension: "mkv",
    },
];

/// Look up the filename extension for a configured media type.
pub fn extension_for(mime: &str) -> Option<&'static str> {
    MEDIA_TYPES
        .iter()
        .find(|media_type| media_type.mime == mime)
        .map(|media_type| media_type.extension)
}
