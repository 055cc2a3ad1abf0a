use serde::{Deserialize, Serialize};

/// Retention, merge and persistence flags of an actor output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPolicy {
    /// Keep each run's container after the run ends.
    pub keep_data_per_run: bool,

    /// Fold every run into the merged container.
    pub auto_merge: bool,

    /// Keep data after the output is closed.
    pub keep_data_in_memory: bool,

    /// Write when asked through `write_data_if_requested`.
    pub write_to_disk: bool,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self {
            keep_data_per_run: false,
            auto_merge: true,
            keep_data_in_memory: true,
            write_to_disk: true,
        }
    }
}
