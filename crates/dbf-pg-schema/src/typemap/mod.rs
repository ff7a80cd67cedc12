//! Type mapping between DBF field types and PostgreSQL.
//!
//! [`TypeMapping`] is an explicitly owned registry keyed by the single-character
//! DBF type code. It is constructed once (usually via [`TypeMapping::new`]) and
//! passed to the translator, so different translators can carry different
//! mappings without any global state.
//!
//! ```rust
//! use dbf_pg_schema::TypeMapping;
//!
//! let mut mapping = TypeMapping::new();
//! assert_eq!(mapping.get_type("c", 30, 0).unwrap(), "VARCHAR(30)");
//!
//! mapping.add_mapping("C", |length, _| format!("CHAR({})", length)).unwrap();
//! assert_eq!(mapping.get_type("C", 30, 0).unwrap(), "CHAR(30)");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SchemaError};

/// Handler rendering a PostgreSQL type from `(length, decimal)`.
pub type TypeHandler = Arc<dyn Fn(u32, u32) -> String + Send + Sync>;

/// Registry of DBF type code → PostgreSQL type handlers.
#[derive(Clone)]
pub struct TypeMapping {
    handlers: BTreeMap<char, TypeHandler>,
}

impl TypeMapping {
    /// Create a registry holding the built-in DBF mappings.
    pub fn new() -> Self {
        let mut mapping = Self::empty();

        // Character / memo
        mapping.insert('C', |length, _| format!("VARCHAR({})", length));
        mapping.insert('M', |_, _| "TEXT".to_string());

        // Numeric
        mapping.insert('N', |length, decimal| {
            if decimal > 0 {
                format!("NUMERIC({},{})", length, decimal)
            } else {
                format!("NUMERIC({})", length)
            }
        });
        mapping.insert('F', |_, _| "DOUBLE PRECISION".to_string());
        mapping.insert('I', |_, _| "INTEGER".to_string());
        mapping.insert('Y', |_, _| "NUMERIC(19,4)".to_string());

        // Date/time
        mapping.insert('D', |_, _| "DATE".to_string());
        mapping.insert('T', |_, _| "TIMESTAMP".to_string());

        // Boolean
        mapping.insert('L', |_, _| "BOOLEAN".to_string());

        // Binary memo / OLE
        mapping.insert('B', |_, _| "BYTEA".to_string());
        mapping.insert('G', |_, _| "BYTEA".to_string());

        mapping
    }

    /// Create a registry with no mappings.
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    fn insert<F>(&mut self, code: char, handler: F)
    where
        F: Fn(u32, u32) -> String + Send + Sync + 'static,
    {
        self.handlers.insert(code, Arc::new(handler));
    }

    /// Map a DBF type code to a PostgreSQL type.
    ///
    /// The code is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnsupportedType` if no handler is registered.
    pub fn get_type(&self, type_code: &str, length: u32, decimal: u32) -> Result<String> {
        let code = normalize_code(type_code)
            .ok_or_else(|| SchemaError::UnsupportedType(type_code.to_string()))?;

        let handler = self
            .handlers
            .get(&code)
            .ok_or_else(|| SchemaError::UnsupportedType(code.to_string()))?;

        Ok(handler(length, decimal))
    }

    /// Register or override the handler for a type code.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MappingRegistration` unless the code is a single
    /// printable ASCII character.
    pub fn add_mapping<F>(&mut self, type_code: &str, handler: F) -> Result<()>
    where
        F: Fn(u32, u32) -> String + Send + Sync + 'static,
    {
        let code = normalize_code(type_code).ok_or_else(|| {
            SchemaError::MappingRegistration(format!(
                "type code must be a single printable ASCII character, got {:?}",
                type_code
            ))
        })?;

        if self.handlers.contains_key(&code) {
            debug!("Overriding type mapping for '{}'", code);
        } else {
            debug!("Registering type mapping for '{}'", code);
        }
        self.insert(code, handler);
        Ok(())
    }

    /// Check if a handler is registered for the type code.
    pub fn supports(&self, type_code: &str) -> bool {
        normalize_code(type_code).is_some_and(|code| self.handlers.contains_key(&code))
    }

    /// Registered type codes in sorted order.
    pub fn codes(&self) -> Vec<char> {
        self.handlers.keys().copied().collect()
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMapping")
            .field("codes", &self.codes())
            .finish()
    }
}

/// Check if a rendered PostgreSQL type holds character data.
pub fn is_textual(pg_type: &str) -> bool {
    let upper = pg_type.trim().to_ascii_uppercase();
    upper.starts_with("VARCHAR")
        || upper.starts_with("CHARACTER")
        || upper.starts_with("CHAR")
        || upper == "TEXT"
}

fn normalize_code(type_code: &str) -> Option<char> {
    let mut chars = type_code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_graphic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}
