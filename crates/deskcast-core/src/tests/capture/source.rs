use crate::SourceKind;
use crate::capture::source::parse_source_id;

/// WHAT: Well-formed opaque ids parse into kind and platform id
/// WHY: Acquisition re-resolves ids; the round-trip must be lossless
#[test]
fn given_valid_ids_when_parsed_then_kind_and_raw_id_returned() {
    // Given/When/Then: Both id namespaces round-trip
    assert_eq!(parse_source_id("screen:3"), Some((SourceKind::Screen, 3)));
    assert_eq!(parse_source_id("window:17"), Some((SourceKind::Window, 17)));
    assert_eq!(parse_source_id("screen:0"), Some((SourceKind::Screen, 0)));
}

/// WHAT: Malformed ids are rejected rather than misresolved
/// WHY: A stale or foreign id must fail acquisition, never pick a wrong target
#[test]
fn given_malformed_ids_when_parsed_then_rejected() {
    // Given/When/Then: Missing separator, unknown namespace, junk payload
    assert_eq!(parse_source_id("screen"), None);
    assert_eq!(parse_source_id("display:1"), None);
    assert_eq!(parse_source_id("window:abc"), None);
    assert_eq!(parse_source_id(""), None);
    assert_eq!(parse_source_id(":4"), None);
}
