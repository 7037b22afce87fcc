use crate::config::Config;

/// Inputs from the frontend collaborators (hotkeys, a selection UI, a
/// settings form) into the controller context.
///
/// The capture session's state machine is the real gate: `Start` and
/// `Stop` are no-ops outside their legal states no matter who sends them.
#[derive(Debug, Clone)]
pub enum UiControl {
    /// Choose the capture source with the given opaque id.
    SelectSource(String),
    /// Start recording; a no-op unless the session is streaming.
    Start,
    /// Stop recording and run the save round-trip; a no-op unless
    /// recording.
    Stop,
    /// Persist a full settings record via the host.
    UpdateSettings(Config),
    /// Ask the host for a fresh source enumeration.
    RefreshSources,
    /// Release the session and shut the application down.
    Quit,
}
