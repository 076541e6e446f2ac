//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::Project;
use crate::import::MappingTable;

/// API root used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Per-request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// rimport configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the achievement API (e.g. http://localhost:8000/api)
    pub api_url: Option<String>,

    /// Bearer token sent with every create request
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Column mapping overrides, merged over the built-in tables
    #[serde(skip_serializing_if = "is_empty_table")]
    pub mappings: MappingTable,
}

fn is_empty_table(table: &MappingTable) -> bool {
    table == &MappingTable::empty()
}

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// 1. built-in defaults
    /// 2. global user config (~/.config/rimport/config.yaml)
    /// 3. workspace config (.rimport/config.yaml)
    /// 4. RIMPORT_* environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut files = Vec::new();
        if let Some(global) = Self::global_config_path() {
            files.push(global);
        }
        if let Ok(project) = Project::discover() {
            files.push(project.config_path());
        }

        let mut config = Self::load_files(&files)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Merge the given files in order; missing files are ignored
    pub fn load_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        for path in files {
            if let Some(layer) = Self::read_file(path)? {
                config.merge(layer);
            }
        }
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<Config>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // An empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(None);
        }

        serde_yml::from_str::<Config>(&contents)
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Apply RIMPORT_API_URL, RIMPORT_TOKEN and RIMPORT_TIMEOUT_SECS
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RIMPORT_API_URL") {
            self.api_url = Some(url);
        }
        if let Some(token) = lookup("RIMPORT_TOKEN") {
            self.token = Some(token);
        }
        if let Some(value) = lookup("RIMPORT_TIMEOUT_SECS") {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "RIMPORT_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            self.timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rimport")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        self.mappings.merge(other.mappings);
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Built-in mapping tables with this config's overrides applied
    pub fn mapping_table(&self) -> MappingTable {
        let mut table = MappingTable::builtin();
        table.merge(self.mappings.clone());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityType;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.token().is_none());
    }

    #[test]
    fn test_later_files_take_precedence() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global.yaml");
        let project = tmp.path().join("project.yaml");
        std::fs::write(&global, "api_url: http://global/api\ntoken: abc\n").unwrap();
        std::fs::write(&project, "api_url: http://project/api\n").unwrap();

        let config = Config::load_files(&[global, project, tmp.path().join("missing.yaml")])
            .unwrap();
        assert_eq!(config.api_url(), "http://project/api");
        assert_eq!(config.token(), Some("abc"));
    }

    #[test]
    fn test_env_overrides_files() {
        let mut config = Config {
            api_url: Some("http://file/api".into()),
            ..Default::default()
        };
        config
            .apply_env(|var| match var {
                "RIMPORT_API_URL" => Some("http://env/api".into()),
                "RIMPORT_TIMEOUT_SECS" => Some("5".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api_url(), "http://env/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_env() {
        let mut config = Config::default();
        let err = config
            .apply_env(|var| (var == "RIMPORT_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "timeout_secs: [not a number\n").unwrap();
        let err = Config::load_files(&[path]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_empty_file_is_ignored() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();
        let config = Config::load_files(&[path]).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_mapping_overrides_layer_over_builtin() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            "\
mappings:
  papers:
    venue:
      rename: journal
  conferences:
    visa_required: keep
",
        )
        .unwrap();

        let table = Config::load_files(&[path]).unwrap().mapping_table();
        assert_eq!(table.target(EntityType::Papers, "venue"), Some("journal"));
        assert_eq!(
            table.target(EntityType::Conferences, "visa_required"),
            Some("visa_required")
        );
        assert_eq!(table.target(EntityType::Conferences, "level"), Some("category"));
    }

    #[test]
    fn test_saved_overrides_load_back() {
        let config = Config {
            api_url: Some("http://saved/api".into()),
            mappings: MappingTable::empty().with(
                EntityType::Patents,
                crate::import::FieldMapping::new()
                    .rename("owner", "inventors")
                    .skip("notes"),
            ),
            ..Default::default()
        };
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, serde_yml::to_string(&config).unwrap()).unwrap();

        let table = Config::load_files(&[path]).unwrap().mapping_table();
        assert_eq!(table.target(EntityType::Patents, "owner"), Some("inventors"));
        assert_eq!(table.target(EntityType::Patents, "notes"), None);
        assert_eq!(table.target(EntityType::Patents, "image_path"), None);
    }

    #[test]
    fn test_empty_token_treated_as_unset() {
        let config = Config {
            token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.token().is_none());
    }
}
