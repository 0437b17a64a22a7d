//! Registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How projects are recognized and how the workspace is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtlasConfig {
    /// Dependency key that marks a manifest as a Blits project.
    pub framework_dependency: String,
    /// Dependency key of the companion formatter plugin.
    pub formatter_dependency: String,
    /// File name of the project manifest.
    pub manifest_name: String,
    /// Directory excluded from the workspace scan.
    pub dependency_cache_dir: String,
    /// Cap on manifests visited by the workspace scan.
    pub max_manifests: usize,
    /// Quiet period before a manifest change is handled.
    pub debounce_ms: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            framework_dependency: "@lightningjs/blits".to_string(),
            formatter_dependency: "@lightningjs/prettier-plugin-blits".to_string(),
            manifest_name: "package.json".to_string(),
            dependency_cache_dir: "node_modules".to_string(),
            max_manifests: 1000,
            debounce_ms: 500,
        }
    }
}

impl AtlasConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Glob matching every manifest in the workspace.
    pub fn manifest_glob(&self) -> String {
        format!("**/{}", self.manifest_name)
    }

    /// Glob matching everything under the dependency cache.
    pub fn exclude_glob(&self) -> String {
        format!("**/{}/**", self.dependency_cache_dir)
    }
}
