//! Configuration validation.

use std::collections::HashSet;

use super::Config;
use crate::core::identifier::{is_plain_identifier, MAX_IDENTIFIER_LENGTH};
use crate::error::{Result, SchemaError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Database validation
    if config.database.host.is_empty() {
        return Err(SchemaError::Config("database.host is required".into()));
    }
    if config.database.database.is_empty() {
        return Err(SchemaError::Config("database.database is required".into()));
    }
    if config.database.user.is_empty() {
        return Err(SchemaError::Config("database.user is required".into()));
    }
    if config.database.port == 0 {
        return Err(SchemaError::Config("database.port must be at least 1".into()));
    }
    if config.database.max_connections == 0 {
        return Err(SchemaError::Config(
            "database.max_connections must be at least 1".into(),
        ));
    }
    if !is_plain_identifier(&config.database.schema) {
        return Err(SchemaError::Config(format!(
            "database.schema must be a lowercase identifier, got '{}'",
            config.database.schema
        )));
    }

    // Primary key naming
    let translation = &config.translation;
    if translation.pk_candidates.is_empty() {
        return Err(SchemaError::Config(
            "translation.pk_candidates must not be empty".into(),
        ));
    }
    if !translation.pk_prefix.is_empty() && !is_plain_identifier(&translation.pk_prefix) {
        return Err(SchemaError::Config(format!(
            "translation.pk_prefix must be a lowercase identifier, got '{}'",
            translation.pk_prefix
        )));
    }

    let mut seen = HashSet::new();
    for candidate in &translation.pk_candidates {
        let name = format!("{}{}", translation.pk_prefix, candidate);
        if candidate.is_empty() || !is_plain_identifier(&name) {
            return Err(SchemaError::Config(format!(
                "translation.pk_candidates entry '{}' does not form a valid column name",
                candidate
            )));
        }
        if name.len() > MAX_IDENTIFIER_LENGTH {
            return Err(SchemaError::Config(format!(
                "primary key name '{}' exceeds {} bytes",
                name, MAX_IDENTIFIER_LENGTH
            )));
        }
        if !seen.insert(candidate.as_str()) {
            return Err(SchemaError::Config(format!(
                "translation.pk_candidates contains '{}' twice",
                candidate
            )));
        }
    }

    Ok(())
}
