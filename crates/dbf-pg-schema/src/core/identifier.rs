//! Identifier validation, sanitization and quoting for generated DDL.
//!
//! Table and column names are spliced unquoted into `CREATE TABLE` text, so
//! the translator only emits names accepted by [`validate_column_name`]:
//! after lowercasing they must match `[a-z_][a-z0-9_]*`. Table names derived
//! from file names are normalized with [`sanitize_table_name`].

use crate::error::ValidationError;

/// PostgreSQL truncates identifiers longer than this many bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate an identifier for safety issues.
///
/// Rejects:
/// - Empty or whitespace-only identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding PostgreSQL's maximum length
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier cannot be empty".to_string(),
        });
    }

    if name.contains('\0') {
        return Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier contains null byte".to_string(),
        });
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason: format!(
                "identifier exceeds maximum length of {} bytes (got {} bytes)",
                MAX_IDENTIFIER_LENGTH,
                name.len()
            ),
        });
    }

    Ok(())
}

/// Validate a table name handed to the translator.
pub fn validate_table_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTableName);
    }
    validate_identifier(name)
}

/// Validate a table or column name that is emitted unquoted.
///
/// Runs [`validate_identifier`], then requires the lowercased name to be a
/// plain identifier so it cannot break out of the column list.
pub fn validate_column_name(name: &str) -> Result<(), ValidationError> {
    validate_identifier(name)?;
    if !is_plain_identifier(&name.to_lowercase()) {
        return Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason: "only letters, digits and underscores are allowed, and it must not start with a digit"
                .to_string(),
        });
    }
    Ok(())
}

/// Check if a name is a plain lowercase identifier (`[a-z_][a-z0-9_]*`).
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Make a database-friendly table name.
///
/// Lowercases, replaces each run of whitespace with a single underscore and
/// drops every character outside `[a-z0-9_]`.
pub fn sanitize_table_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_whitespace = false;

    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        }
    }

    out
}

/// Quote a PostgreSQL identifier.
///
/// Escapes double quotes by doubling them and wraps in double quotes.
pub fn quote_pg(name: &str) -> Result<String, ValidationError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
