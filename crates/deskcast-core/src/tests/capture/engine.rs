use crate::capture::engine::encoder_args;

/// WHAT: Every recognized media type maps to complete encoder arguments
/// WHY: The media type chosen in settings decides the emitted container
#[test]
#[allow(clippy::unwrap_used)]
fn given_known_media_types_when_mapped_then_encoder_args_exist() {
    // Given/When/Then: Each recognized type carries a codec and a muxer
    for media_type in ["video/webm", "video/mp4", "video/x-matroska"] {
        let args = encoder_args(media_type).unwrap();
        assert!(args.contains(&"-c:v"));
        assert!(args.contains(&"-f"));
    }
}

/// WHAT: Unrecognized media types have no encoder mapping
/// WHY: An unmapped type must fail acquisition, never fall back silently
#[test]
fn given_unknown_media_type_when_mapped_then_none() {
    // Given/When/Then: Unknown, empty, and extension-only inputs all miss
    assert!(encoder_args("video/avi").is_none());
    assert!(encoder_args("").is_none());
    assert!(encoder_args("webm").is_none());
}
