//! Server configuration.

use blits_atlas::AtlasConfig;
use blits_canon::TsgoEngineConfig;
use serde::{Deserialize, Serialize};

/// Settings the language server runs with.
///
/// Loaded from `blits.config.json` by the CLI; a client may send the same
/// shape as `initializationOptions`, which then takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaestroConfig {
    pub workspace: AtlasConfig,
    pub engine: TsgoEngineConfig,
}

impl MaestroConfig {
    /// Parse `initializationOptions`. Anything that is not a valid config
    /// object is ignored with a warning.
    pub fn from_initialization_options(options: Option<serde_json::Value>) -> Option<Self> {
        let options = options?;
        if options.is_null() {
            return None;
        }
        match serde_json::from_value(options) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("ignoring invalid initializationOptions: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_options_keep_defaults() {
        let config = MaestroConfig::from_initialization_options(Some(json!({
            "workspace": { "debounceMs": 100 },
            "engine": { "tsgoPath": "/opt/tsgo" }
        })))
        .unwrap();

        assert_eq!(config.workspace.debounce_ms, 100);
        assert_eq!(config.workspace.manifest_name, "package.json");
        assert_eq!(config.engine.tsgo_path.as_deref(), Some(std::path::Path::new("/opt/tsgo")));
        assert_eq!(config.engine.timeout_ms, 30000);
    }

    #[test]
    fn test_missing_or_invalid_options() {
        assert!(MaestroConfig::from_initialization_options(None).is_none());
        assert!(MaestroConfig::from_initialization_options(Some(serde_json::Value::Null)).is_none());
        assert!(MaestroConfig::from_initialization_options(Some(json!({ "workspace": 3 }))).is_none());
    }
}
