use crate::config::{default_fps, default_show_cursor};

use serde::{Deserialize, Serialize};

/// Capture stream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target capture framerate.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Whether the cursor is included in recordings.
    #[serde(default = "default_show_cursor")]
    pub show_cursor: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            show_cursor: default_show_cursor(),
        }
    }
}
