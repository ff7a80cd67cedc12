//! Table generation strategies.
//!
//! Each [`TableGenerator`] variant prepends a fixed set of bookkeeping columns
//! to the columns derived from the source fields:
//!
//! | variant     | bookkeeping columns                       |
//! |-------------|-------------------------------------------|
//! | `Basic`     | primary key                               |
//! | `Timestamp` | primary key, `created_at`                 |
//! | `Audit`     | primary key, `created_at`, `updated_at`   |
//!
//! Field types are resolved through a [`FieldTypeConverter`], normally the
//! [`SchemaTranslator`](crate::SchemaTranslator) that owns the type mapping.

use crate::core::{ColumnDef, FieldDescriptor, GeneratedSchema, TableMode};
use crate::error::Result;
use crate::typemap::is_textual;

/// Column added by `Timestamp` and `Audit` tables.
pub const CREATED_AT: &str = "created_at";
/// Column added by `Audit` tables.
pub const UPDATED_AT: &str = "updated_at";

/// Resolve the PostgreSQL type of a source field.
pub trait FieldTypeConverter {
    /// Convert a field descriptor to a PostgreSQL type string.
    fn convert_field_type(&self, field: &FieldDescriptor) -> Result<String>;
}

/// Bookkeeping policy for generated tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableGenerator {
    /// Primary key only.
    #[default]
    Basic,
    /// Primary key and creation timestamp.
    Timestamp,
    /// Primary key, creation and update timestamps.
    Audit,
}

impl TableGenerator {
    /// Select the generator for a table mode.
    pub fn for_mode(mode: TableMode) -> Self {
        match mode {
            TableMode::Basic => TableGenerator::Basic,
            TableMode::Timestamp => TableGenerator::Timestamp,
            TableMode::Audit => TableGenerator::Audit,
        }
    }

    /// Select the generator for a configured mode name.
    ///
    /// Matching is case-insensitive; unrecognized names select `Basic`.
    pub fn from_config(mode: &str) -> Self {
        Self::for_mode(TableMode::parse_lenient(mode))
    }

    /// Table mode this generator implements.
    pub fn mode(&self) -> TableMode {
        match self {
            TableGenerator::Basic => TableMode::Basic,
            TableGenerator::Timestamp => TableMode::Timestamp,
            TableGenerator::Audit => TableMode::Audit,
        }
    }

    /// Timestamp column names this generator adds after the primary key.
    pub fn timestamp_columns(&self) -> &'static [&'static str] {
        match self {
            TableGenerator::Basic => &[],
            TableGenerator::Timestamp => &[CREATED_AT],
            TableGenerator::Audit => &[CREATED_AT, UPDATED_AT],
        }
    }

    /// Fixed columns placed ahead of the field columns.
    pub fn bookkeeping_columns(&self, primary_key_name: &str) -> Vec<ColumnDef> {
        let mut columns = vec![ColumnDef::serial_primary_key(primary_key_name)];
        columns.extend(self.timestamp_columns().iter().map(|name| ColumnDef::timestamp_now(*name)));
        columns
    }

    /// Full ordered column list: bookkeeping columns, then one per field.
    ///
    /// Fails on the first field whose type cannot be converted.
    pub fn columns(
        &self,
        converter: &dyn FieldTypeConverter,
        fields: &[FieldDescriptor],
        primary_key_name: &str,
    ) -> Result<Vec<ColumnDef>> {
        let mut columns = self.bookkeeping_columns(primary_key_name);
        columns.reserve(fields.len());

        for field in fields {
            columns.push(field_column(converter, field)?);
        }

        Ok(columns)
    }

    /// Build the structured table definition.
    pub fn build_schema(
        &self,
        converter: &dyn FieldTypeConverter,
        table_name: &str,
        fields: &[FieldDescriptor],
        primary_key_name: &str,
    ) -> Result<GeneratedSchema> {
        Ok(GeneratedSchema {
            table_name: table_name.to_string(),
            primary_key_name: primary_key_name.to_string(),
            columns: self.columns(converter, fields, primary_key_name)?,
            mode: self.mode(),
        })
    }

    /// Render the `CREATE TABLE` statement.
    pub fn generate_table(
        &self,
        converter: &dyn FieldTypeConverter,
        table_name: &str,
        fields: &[FieldDescriptor],
        primary_key_name: &str,
    ) -> Result<String> {
        Ok(self
            .build_schema(converter, table_name, fields, primary_key_name)?
            .to_ddl())
    }
}

fn field_column(converter: &dyn FieldTypeConverter, field: &FieldDescriptor) -> Result<ColumnDef> {
    let data_type = converter.convert_field_type(field)?;

    let mut column = ColumnDef::field(field.normalized_name(), data_type);
    if !field.empty_as_null && is_textual(&column.data_type) {
        column.default = Some("''".to_string());
    }
    column.not_null = field.not_null;

    Ok(column)
}
