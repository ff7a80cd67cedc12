//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::TableMode;
use crate::translator::PrimaryKeyPolicy;

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations.
    pub paths: PathsConfig,

    /// Target database (PostgreSQL) configuration.
    pub database: DatabaseConfig,

    /// Feature flags.
    pub features: FeaturesConfig,

    /// Field filtering and primary key naming.
    pub translation: TranslationConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding DBF files (default: "mockDBF/").
    pub dbf_directory: PathBuf,

    /// Directory preview files are written to (default: "generated_sql/").
    pub sql_output_directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dbf_directory: PathBuf::from("mockDBF/"),
            sql_output_directory: PathBuf::from("generated_sql/"),
        }
    }
}

/// Target database (PostgreSQL) configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database host (default: "localhost").
    pub host: String,

    /// Database port (default: 5432).
    pub port: u16,

    /// Database name (default: "dbfields_db").
    pub database: String,

    /// Username (default: "postgres").
    pub user: String,

    /// Password.
    pub password: String,

    /// Schema tables are created in (default: "public").
    pub schema: String,

    /// Maximum pooled connections (default: 4).
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "dbfields_db".to_string(),
            user: "postgres".to_string(),
            password: "secret".to_string(),
            schema: "public".to_string(),
            max_connections: 4,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Feature flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Table mode name: basic, timestamp or audit (default: "basic").
    /// Unrecognized names fall back to basic.
    pub table_mode: String,

    /// Write each generated table to a preview file (default: false).
    pub preview_mode: bool,
}

impl FeaturesConfig {
    /// Parsed table mode.
    pub fn table_mode(&self) -> TableMode {
        TableMode::parse_lenient(&self.table_mode)
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            table_mode: TableMode::Basic.as_str().to_string(),
            preview_mode: false,
        }
    }
}

/// Field filtering and primary key naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Field names dropped from every table (case-insensitive).
    pub exclude_fields: Vec<String>,

    /// Primary key candidates tried in order (default: id, rowid, record_id).
    pub pk_candidates: Vec<String>,

    /// Prefix for primary key names (default: "local_").
    pub pk_prefix: String,
}

impl TranslationConfig {
    /// Primary key policy built from this section.
    pub fn pk_policy(&self) -> PrimaryKeyPolicy {
        PrimaryKeyPolicy {
            prefix: self.pk_prefix.clone(),
            candidates: self.pk_candidates.clone(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let policy = PrimaryKeyPolicy::default();
        Self {
            exclude_fields: Vec::new(),
            pk_candidates: policy.candidates,
            pk_prefix: policy.prefix,
        }
    }
}
