//! Core types used throughout schema translation.
//!
//! - [`schema`]: field descriptors, table modes, and generated column/table types
//! - [`identifier`]: identifier validation, sanitization, and quoting

pub mod identifier;
pub mod schema;

pub use schema::{
    ColumnDef, ColumnOrigin, FieldDescriptor, GeneratedSchema, TableDefinition, TableMode,
};
