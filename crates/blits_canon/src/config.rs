//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the tsgo-backed engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TsgoEngineConfig {
    /// Path to the tsgo executable. Searched for when unset.
    pub tsgo_path: Option<PathBuf>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// How long to wait for published diagnostics after a sync
    pub diagnostics_wait_ms: u64,
}

impl Default for TsgoEngineConfig {
    fn default() -> Self {
        Self {
            tsgo_path: None,
            timeout_ms: 30000,
            diagnostics_wait_ms: 50,
        }
    }
}

impl TsgoEngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn diagnostics_wait(&self) -> Duration {
        Duration::from_millis(self.diagnostics_wait_ms)
    }
}
