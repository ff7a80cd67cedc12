//! # dbf-pg-schema
//!
//! Translate dBASE/FoxPro (DBF) table structures into PostgreSQL
//! `CREATE TABLE` statements.
//!
//! The library covers:
//!
//! - **Type mapping** from single-letter DBF type codes to PostgreSQL types,
//!   extensible at runtime
//! - **Table modes** adding a primary key and optional audit timestamps
//! - **Field filtering** to drop columns before translation
//! - **Collision-free primary keys** that never shadow a source field
//! - **SQL previews** written to timestamped files
//! - **DDL execution** against PostgreSQL through a connection pool
//!
//! ## Example
//!
//! ```rust
//! use dbf_pg_schema::{FieldDescriptor, SchemaTranslator, TableMode, TypeMapping};
//!
//! let translator = SchemaTranslator::new(TypeMapping::new()).with_mode(TableMode::Timestamp);
//! let fields = vec![FieldDescriptor::new("NOME", "C", 30, 0)];
//!
//! let table = translator.generate_table("clientes", &fields)?;
//! assert!(table.ddl().contains("nome VARCHAR(30)"));
//! assert!(table.ddl().contains("created_at TIMESTAMP"));
//! # Ok::<(), dbf_pg_schema::SchemaError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod generator;
pub mod preview;
pub mod source;
pub mod target;
pub mod translator;
pub mod typemap;

// Re-exports for convenient access
pub use config::{Config, DatabaseConfig, FeaturesConfig, PathsConfig, TranslationConfig};
pub use crate::core::{
    ColumnDef, ColumnOrigin, FieldDescriptor, GeneratedSchema, TableDefinition, TableMode,
};
pub use error::{Result, SchemaError, ValidationError};
pub use filter::{ExclusionState, FieldFilter};
pub use generator::{FieldTypeConverter, TableGenerator};
pub use preview::{FilePreviewSink, PreviewSink};
pub use source::{DbfHeader, DbfSource};
pub use target::{DdlTarget, ExecuteOutcome, PgTarget};
pub use translator::{PrimaryKeyPolicy, SchemaTranslator};
pub use typemap::TypeMapping;
