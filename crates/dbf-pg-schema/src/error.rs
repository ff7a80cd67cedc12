//! Error types for the schema translation library.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for invalid field descriptors or table names.
pub const EXIT_VALIDATION_ERROR: u8 = 2;
/// Exit code for type codes with no registered mapping.
pub const EXIT_UNSUPPORTED_TYPE: u8 = 3;
/// Exit code for target database failures.
pub const EXIT_TARGET_ERROR: u8 = 4;
/// Exit code for malformed source files.
pub const EXIT_SOURCE_ERROR: u8 = 5;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Rejected input to the translation core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Table name is empty or whitespace.
    #[error("Table name cannot be empty")]
    EmptyTableName,

    /// Identifier failed a safety check.
    #[error("Invalid identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Two columns of the generated table would share a name.
    #[error("Column {name:?} would duplicate {conflict}")]
    DuplicateColumn { name: String, conflict: String },

    /// A required descriptor attribute was absent.
    #[error("Field '{field}' is missing required attribute '{attribute}'")]
    MissingAttribute { field: String, attribute: String },

    /// A descriptor attribute was present but out of range.
    #[error("Field '{field}' has invalid {attribute} {value}: {reason}")]
    InvalidValue {
        field: String,
        attribute: String,
        value: i64,
        reason: String,
    },
}

/// Main error type for schema translation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Configuration error (invalid YAML, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input to the translator was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The field filter was queried before `configure` was called.
    #[error("Field filter is not configured; call configure() before included_fields()")]
    NotConfigured,

    /// No mapping is registered for the type code.
    #[error("Unsupported DBF field type: {0}")]
    UnsupportedType(String),

    /// A type mapping could not be registered.
    #[error("Invalid type mapping: {0}")]
    MappingRegistration(String),

    /// The DBF file could not be parsed.
    #[error("Invalid DBF file {path}: {reason}")]
    DbfFormat { path: PathBuf, reason: String },

    /// Target database query error
    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        SchemaError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a DbfFormat error
    pub fn dbf_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SchemaError::DbfFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaError::Config(_) | SchemaError::Yaml(_) | SchemaError::Json(_) => {
                EXIT_CONFIG_ERROR
            }
            SchemaError::Validation(_)
            | SchemaError::NotConfigured
            | SchemaError::MappingRegistration(_) => EXIT_VALIDATION_ERROR,
            SchemaError::UnsupportedType(_) => EXIT_UNSUPPORTED_TYPE,
            SchemaError::Target(_) | SchemaError::Pool { .. } => EXIT_TARGET_ERROR,
            SchemaError::DbfFormat { .. } => EXIT_SOURCE_ERROR,
            SchemaError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(SchemaError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(SchemaError::NotConfigured.exit_code(), EXIT_VALIDATION_ERROR);
        assert_eq!(
            SchemaError::UnsupportedType("X".into()).exit_code(),
            EXIT_UNSUPPORTED_TYPE
        );
        assert_eq!(
            SchemaError::dbf_format("a.dbf", "short header").exit_code(),
            EXIT_SOURCE_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(SchemaError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_validation_messages_name_the_problem() {
        let missing = ValidationError::MissingAttribute {
            field: "NOME".into(),
            attribute: "length".into(),
        };
        assert!(missing.to_string().contains("missing required attribute 'length'"));

        let invalid = ValidationError::InvalidValue {
            field: "NOME".into(),
            attribute: "length".into(),
            value: 0,
            reason: "must be a positive integer".into(),
        };
        assert!(invalid.to_string().contains("invalid length 0"));
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = SchemaError::from(ValidationError::EmptyTableName);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Validation error: Table name cannot be empty"));
    }
}
