//! Schema types shared by the source reader, generators, and translator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Metadata for one column of a DBF table.
///
/// `length` and `decimal` are optional so descriptors deserialized from a
/// manifest can be checked for missing attributes before translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as stored in the source (case preserved).
    pub name: String,

    /// DBF type code (C, N, D, L, M, B, G, F, ...).
    #[serde(rename = "type")]
    pub type_code: String,

    /// Field width in bytes. Must be positive.
    #[serde(default)]
    pub length: Option<i64>,

    /// Decimal places. Must be non-negative.
    #[serde(default)]
    pub decimal: Option<i64>,

    /// Emit `NOT NULL` for this column.
    #[serde(default)]
    pub not_null: bool,

    /// Treat empty strings as NULL. When false, character columns get `DEFAULT ''`.
    #[serde(default = "default_true")]
    pub empty_as_null: bool,
}

impl FieldDescriptor {
    /// Create a descriptor with both size attributes set and default null handling.
    pub fn new(name: impl Into<String>, type_code: impl Into<String>, length: i64, decimal: i64) -> Self {
        Self {
            name: name.into(),
            type_code: type_code.into(),
            length: Some(length),
            decimal: Some(decimal),
            not_null: false,
            empty_as_null: true,
        }
    }

    /// Mark the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Keep empty strings instead of treating them as NULL.
    pub fn keep_empty_strings(mut self) -> Self {
        self.empty_as_null = false;
        self
    }

    /// Field name folded to lowercase, as used for comparisons and column names.
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Bookkeeping policy applied to every generated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Primary key only.
    #[default]
    Basic,

    /// Primary key plus `created_at`.
    Timestamp,

    /// Primary key plus `created_at` and `updated_at`.
    Audit,
}

impl TableMode {
    /// Parse a configured mode name. Unrecognized values fall back to `Basic`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "timestamp" => TableMode::Timestamp,
            "audit" => TableMode::Audit,
            _ => TableMode::Basic,
        }
    }

    /// Lowercase mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableMode::Basic => "basic",
            TableMode::Timestamp => "timestamp",
            TableMode::Audit => "audit",
        }
    }
}

impl From<&str> for TableMode {
    fn from(value: &str) -> Self {
        TableMode::parse_lenient(value)
    }
}

impl fmt::Display for TableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a generated column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrigin {
    /// Fixed column added by the table mode.
    Bookkeeping,
    /// Column derived from a source field.
    Field,
}

/// One column of a generated `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// PostgreSQL type.
    pub data_type: String,

    /// Default expression, if any.
    pub default: Option<String>,

    /// Column is `NOT NULL`.
    pub not_null: bool,

    /// Column is the primary key.
    pub primary_key: bool,

    /// Bookkeeping or field-derived.
    pub origin: ColumnOrigin,
}

impl ColumnDef {
    /// Auto-incrementing integer primary key.
    pub fn serial_primary_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: "SERIAL".to_string(),
            default: None,
            not_null: false,
            primary_key: true,
            origin: ColumnOrigin::Bookkeeping,
        }
    }

    /// Timestamp defaulting to the insertion time.
    pub fn timestamp_now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: "TIMESTAMP".to_string(),
            default: Some("CURRENT_TIMESTAMP".to_string()),
            not_null: true,
            primary_key: false,
            origin: ColumnOrigin::Bookkeeping,
        }
    }

    /// Column derived from a source field.
    pub fn field(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default: None,
            not_null: false,
            primary_key: false,
            origin: ColumnOrigin::Field,
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {}", default)?;
        }
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        Ok(())
    }
}

/// A rendered table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchema {
    /// Sanitized table name.
    pub table_name: String,

    /// Synthesized primary key column name.
    pub primary_key_name: String,

    /// Bookkeeping columns first, then field columns in source order.
    pub columns: Vec<ColumnDef>,

    /// Mode that produced the bookkeeping columns.
    pub mode: TableMode,
}

impl GeneratedSchema {
    /// Render the `CREATE TABLE` statement.
    pub fn to_ddl(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(ColumnDef::to_string)
            .collect::<Vec<_>>()
            .join(",\n  ");
        format!("CREATE TABLE {} (\n  {}\n);", self.table_name, body)
    }

    /// Columns derived from source fields.
    pub fn field_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Field)
    }
}

/// Result of translating one table.
///
/// The DDL payload and the preview artifact are carried side by side so the
/// caller decides which one to use.
#[derive(Debug, Clone, Serialize)]
pub struct TableDefinition {
    /// Structured table definition.
    pub schema: GeneratedSchema,

    /// Rendered DDL.
    pub ddl: Option<String>,

    /// Path of the persisted preview, when preview mode is on.
    pub preview: Option<PathBuf>,
}

impl TableDefinition {
    /// DDL text, rendering from the schema if no payload was kept.
    pub fn ddl(&self) -> String {
        self.ddl.clone().unwrap_or_else(|| self.schema.to_ddl())
    }
}

fn default_true() -> bool {
    true
}
