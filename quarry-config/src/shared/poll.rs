use serde::{Deserialize, Serialize};

/// Bounded polling policy used while waiting for a dependent service.
///
/// This is the only form of retry in the system: a fixed interval probed
/// until a fixed deadline, after which the run aborts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between consecutive probes.
    pub interval_secs: u64,
    /// Total seconds to keep probing before giving up.
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            timeout_secs: 300,
        }
    }
}
