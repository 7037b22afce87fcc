use std::time::Instant;

/// Local record/stop belief for the hotkey toggle.
///
/// The capture session's state machine remains the real gate; this only
/// decides whether the next toggle press sends `Start` or `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Next press requests a recording start.
    Idle,
    /// Next press requests a stop.
    Recording {
        /// When the start control was sent.
        started_at: Instant,
    },
}
