//! Configuration file loading for blits.
//!
//! Reads `blits.config.json` from the current working directory.

use std::path::Path;

use blits_atlas::AtlasConfig;
use blits_canon::TsgoEngineConfig;
use blits_maestro::MaestroConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "blits.config.json";

/// Top-level blits configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BlitsConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Project discovery settings.
    #[serde(default)]
    pub workspace: AtlasConfig,

    /// Script engine settings.
    #[serde(default)]
    pub engine: TsgoEngineConfig,
}

impl BlitsConfig {
    pub fn maestro(&self) -> MaestroConfig {
        MaestroConfig {
            workspace: self.workspace.clone(),
            engine: self.engine.clone(),
        }
    }
}

/// Load `blits.config.json` from the given directory (or CWD if None).
pub fn load_config(dir: Option<&Path>) -> BlitsConfig {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE);

    if !config_path.exists() {
        return BlitsConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "\x1b[33mWarning:\x1b[0m Failed to parse {}: {}",
                    config_path.display(),
                    e
                );
                BlitsConfig::default()
            }
        },
        Err(e) => {
            eprintln!(
                "\x1b[33mWarning:\x1b[0m Failed to read {}: {}",
                config_path.display(),
                e
            );
            BlitsConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path()));

        assert!(config.schema.is_none());
        assert_eq!(config.workspace, AtlasConfig::default());
    }

    #[test]
    fn test_sections_are_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{
  "$schema": "./blits.schema.json",
  "workspace": { "maxManifests": 50, "debounceMs": 200 },
  "engine": { "timeoutMs": 1000 }
}"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()));
        assert_eq!(config.schema.as_deref(), Some("./blits.schema.json"));
        assert_eq!(config.workspace.max_manifests, 50);
        assert_eq!(config.workspace.debounce_ms, 200);
        assert_eq!(config.engine.timeout_ms, 1000);

        let maestro = config.maestro();
        assert_eq!(maestro.workspace.max_manifests, 50);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let config = load_config(Some(dir.path()));
        assert_eq!(config.workspace, AtlasConfig::default());
        assert_eq!(config.engine, TsgoEngineConfig::default());
    }
}
