use crate::media_type::{MEDIA_TYPES, extension_for};

/// WHAT: Every table entry maps to its documented extension
/// WHY: The extension decides the dialog filter and the default filename
#[test]
fn given_known_media_types_when_looked_up_then_extensions_match() {
    // Given/When/Then: The three recognized formats resolve
    assert_eq!(extension_for("video/webm"), Some("webm"));
    assert_eq!(extension_for("video/mp4"), Some("mp4"));
    assert_eq!(extension_for("video/x-matroska"), Some("mkv"));
}

/// WHAT: Unknown media types resolve to nothing
/// WHY: An unmapped type is a configuration error, never a silent default
#[test]
fn given_unknown_media_type_when_looked_up_then_none() {
    // Given/When/Then: Unknown, empty, and extension-only inputs all miss
    assert_eq!(extension_for("video/avi"), None);
    assert_eq!(extension_for(""), None);
    assert_eq!(extension_for("webm"), None);
}

/// WHAT: The table has no duplicate MIME entries
/// WHY: Lookup takes the first match; duplicates would shadow silently
#[test]
fn given_media_type_table_when_scanned_then_mimes_unique() {
    // Given: The full table
    let mut seen = Vec::new();

    // When/Then: Every MIME appears exactly once
    for entry in MEDIA_TYPES {
        assert!(!seen.contains(&entry.mime), "duplicate mime: {}", entry.mime);
        seen.push(entry.mime);
    }
}
