//! Capture source enumeration.
//!
//! Sources are immutable snapshots of what the platform offers right now;
//! windows open and close, so a list goes stale immediately. Acquisition
//! re-resolves the opaque id against a fresh enumeration instead of caching
//! platform handles.

use scap::Target;
use tracing::{info, instrument};

/// Kind of on-screen capture target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A single application window.
    Window,
    /// An entire display.
    Screen,
}

/// An enumerable capture target with an opaque platform-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Opaque identifier, e.g. `screen:3` or `window:17`. Only meaningful
    /// to stream acquisition.
    pub id: String,
    /// Human-readable name (display name or window title).
    pub name: String,
    /// Whether this is a window or a full display.
    pub kind: SourceKind,
}

/// List the capture sources currently offered by the platform.
///
/// An empty list is a valid outcome (rendered as "no sources available"),
/// not an error.
#[instrument]
pub fn list_sources() -> Vec<Source> {
    let sources: Vec<Source> = scap::get_all_targets()
        .iter()
        .map(source_from_target)
        .collect();

    info!(count = sources.len(), "Enumerated capture sources");

    sources
}

fn source_from_target(target: &Target) -> Source {
    match target {
        Target::Display(display) => Source {
            id: format!("screen:{}", display.id),
            name: display.title.clone(),
            kind: SourceKind::Screen,
        },
        Target::Window(window) => Source {
            id: format!("window:{}", window.id),
            name: window.title.clone(),
            kind: SourceKind::Window,
        },
    }
}

/// Parse an opaque source id back into its kind and platform id.
pub(crate) fn parse_source_id(id: &str) -> Option<(SourceKind, u32)> {
    let (kind, raw) = id.split_once(':')?;
    let raw = raw.parse().ok()?;
    match kind {
        "screen" => Some((SourceKind::Screen, raw)),
        "window" => Some((SourceKind::Window, raw)),
        _ => None,
    }
}

/// Resolve an opaque id against a fresh enumeration.
///
/// Returns `None` for malformed ids and for ids whose target has gone away
/// since the list was produced.
pub(crate) fn resolve_target(id: &str) -> Option<Target> {
    let (kind, raw) = parse_source_id(id)?;
    scap::get_all_targets()
        .into_iter()
        .find(|target| match (kind, target) {
            (SourceKind::Screen, Target::Display(display)) => display.id == raw,
            (SourceKind::Window, Target::Window(window)) => window.id == raw,
            _ => false,
        })
}
