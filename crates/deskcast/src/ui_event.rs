use crate::config::Config;

use deskcast_core::Source;

/// Events pushed from the privileged host to the controller context.
///
/// All fire-and-forget; no ordering is guaranteed between kinds.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A fresh enumeration of capture sources. May be empty.
    SourcesAvailable(Vec<Source>),
    /// The settings record as loaded at host startup.
    SettingsSnapshot(Config),
    /// The settings record after a confirmed durable update.
    SettingsUpdated(Config),
}
