//! Configuration schema (apivet.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_enabled() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatConfig {
    /// Whether compatibility checking is enabled at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Baseline version label to compare against
    #[serde(default)]
    pub previous_version: Option<String>,

    /// Path to the accepted-changes file (relative paths resolve
    /// against the config file's directory)
    #[serde(default)]
    pub accepted_changes: Option<PathBuf>,

    /// Only accepted-changes entries starting with this prefix apply to
    /// this module (for shared accepted-changes files)
    #[serde(default)]
    pub module_prefix: Option<String>,

    /// Package name patterns to exclude from checking (supports `*`)
    #[serde(default)]
    pub excluded_packages: Vec<String>,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            previous_version: None,
            accepted_changes: None,
            module_prefix: None,
            excluded_packages: Vec::new(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl CompatConfig {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: CompatConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Accepted-changes path with relative paths resolved against the
    /// project root
    pub fn resolved_accepted_changes(&self) -> Option<PathBuf> {
        self.accepted_changes.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.project_root.join(path)
            }
        })
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CompatConfig::default();
        assert!(config.enabled);
        assert!(config.accepted_changes.is_none());
        assert!(config.excluded_packages.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let config = CompatConfig::from_toml(
            r#"
            enabled = true
            previous_version = "1.2.0"
            accepted_changes = "accepted-api-changes.txt"
            module_prefix = "com.acme"
            excluded_packages = ["*.shadow.*"]
            "#,
        )
        .unwrap();

        assert_eq!(config.previous_version.as_deref(), Some("1.2.0"));
        assert_eq!(config.module_prefix.as_deref(), Some("com.acme"));
        assert_eq!(config.excluded_packages, vec!["*.shadow.*".to_string()]);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = CompatConfig::from_toml("previous_version = \"1.2.0\"").unwrap();
        assert!(config.enabled);
        assert!(config.accepted_changes.is_none());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result = CompatConfig::from_toml("enabled = maybe");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = CompatConfig::default();
        config.previous_version = Some("1.2.0".to_string());
        let toml = toml::to_string(&config).unwrap();
        let parsed = CompatConfig::from_toml(&toml).unwrap();
        assert_eq!(config.previous_version, parsed.previous_version);
    }

    #[test]
    fn relative_accepted_path_resolves_against_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("apivet.toml");
        std::fs::write(&config_path, "accepted_changes = \"accepted.txt\"").unwrap();

        let config = CompatConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.resolved_accepted_changes(),
            Some(dir.path().join("accepted.txt"))
        );
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let result = CompatConfig::from_file(Path::new("/nonexistent/apivet.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
