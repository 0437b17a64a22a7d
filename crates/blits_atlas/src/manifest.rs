//! `package.json` model.

use std::path::PathBuf;

use blits_carton::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

/// Errors reading a manifest. Both variants mean "not a project".
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The parts of a package manifest the registry cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: FxHashMap<String, Value>,
    #[serde(default)]
    pub dev_dependencies: FxHashMap<String, Value>,
    #[serde(default)]
    pub peer_dependencies: FxHashMap<String, Value>,
}

impl PackageManifest {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Whether `dependency` appears in any of the three dependency maps.
    pub fn declares(&self, dependency: &str) -> bool {
        self.dependencies.contains_key(dependency)
            || self.dev_dependencies.contains_key(dependency)
            || self.peer_dependencies.contains_key(dependency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_across_maps() {
        let manifest = PackageManifest::parse(
            r#"{
                "name": "demo",
                "dependencies": { "@lightningjs/blits": "^1.0.0" },
                "devDependencies": { "@lightningjs/prettier-plugin-blits": "1.0.0" }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert!(manifest.declares("@lightningjs/blits"));
        assert!(manifest.declares("@lightningjs/prettier-plugin-blits"));
        assert!(!manifest.declares("react"));

        let peer = PackageManifest::parse(r#"{ "peerDependencies": { "@lightningjs/blits": "*" } }"#)
            .unwrap();
        assert!(peer.declares("@lightningjs/blits"));
    }

    #[test]
    fn test_minimal_and_invalid_manifests() {
        let empty = PackageManifest::parse("{}").unwrap();
        assert!(empty.name.is_none());
        assert!(!empty.declares("@lightningjs/blits"));

        assert!(PackageManifest::parse("{ not json").is_err());
        assert!(PackageManifest::parse("[]").is_err());
    }
}
