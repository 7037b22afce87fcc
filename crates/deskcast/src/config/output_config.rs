use crate::config::default_file_type;

use serde::{Deserialize, Serialize};

/// Output format configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Media type of saved recordings; must appear in the media-type table.
    #[serde(default = "default_file_type")]
    pub file_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_type: default_file_type(),
        }
    }
}
