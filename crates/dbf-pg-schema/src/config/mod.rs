//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;
use tracing::{debug, info};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML file, or use defaults if the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            debug!("{} not found, using default configuration", path.display());
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TableMode;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.paths.dbf_directory, PathBuf::from("mockDBF/"));
        assert_eq!(config.paths.sql_output_directory, PathBuf::from("generated_sql/"));
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.database, "dbfields_db");
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.features.table_mode(), TableMode::Basic);
        assert!(!config.features.preview_mode);
        assert_eq!(config.translation.pk_candidates, vec!["id", "rowid", "record_id"]);
        assert_eq!(config.translation.pk_prefix, "local_");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
features:
  table_mode: Audit
  preview_mode: true
translation:
  exclude_fields: [SENHA, obs]
"#,
        )
        .unwrap();
        assert_eq!(config.features.table_mode(), TableMode::Audit);
        assert!(config.features.preview_mode);
        assert_eq!(config.translation.exclude_fields, vec!["SENHA", "obs"]);
        assert_eq!(config.translation.pk_prefix, "local_");
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn test_unknown_table_mode_falls_back_to_basic() {
        let config = Config::from_yaml("features:\n  table_mode: fancy\n").unwrap();
        assert_eq!(config.features.table_mode(), TableMode::Basic);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("database: [unclosed").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "database:\n  host: db.internal\n  port: 6543\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.schema, "public");
    }
}
