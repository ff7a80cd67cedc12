//! Schema translation: DBF field descriptors to a PostgreSQL table definition.
//!
//! [`SchemaTranslator`] owns the [`TypeMapping`] and the active
//! [`TableGenerator`]. For every table it:
//!
//! 1. validates the table name and field names
//! 2. picks a primary key name that does not collide with any field
//! 3. renders the columns through the generator
//! 4. optionally writes a preview artifact
//!
//! The result is a [`TableDefinition`] carrying the DDL and, when previews are
//! enabled, the artifact path.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::identifier::{validate_column_name, validate_table_name};
use crate::core::{FieldDescriptor, TableDefinition, TableMode};
use crate::error::{Result, ValidationError};
use crate::generator::{FieldTypeConverter, TableGenerator};
use crate::preview::{FilePreviewSink, PreviewSink};
use crate::typemap::TypeMapping;

/// Default reserved identifiers, in priority order.
pub const DEFAULT_PK_CANDIDATES: &[&str] = &["id", "rowid", "record_id"];

/// Default prefix for synthesized primary key names.
pub const DEFAULT_PK_PREFIX: &str = "local_";

/// Candidate used when every `<prefix><candidate>` name is taken.
const FALLBACK_PK_CANDIDATE: &str = "rowid";

/// Primary key naming policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyPolicy {
    /// Prefix prepended to each candidate.
    pub prefix: String,
    /// Candidates tried in order.
    pub candidates: Vec<String>,
}

impl PrimaryKeyPolicy {
    /// Pick the first `<prefix><candidate>` absent from `existing` (lowercase names).
    ///
    /// Falls back to `<prefix>rowid` when everything collides, even if that
    /// name collides as well.
    pub fn choose(&self, existing: &HashSet<String>) -> String {
        for candidate in &self.candidates {
            let name = format!("{}{}", self.prefix, candidate).to_lowercase();
            if !existing.contains(&name) {
                return name;
            }
            debug!("Primary key candidate '{}' collides with a field", name);
        }

        let fallback = format!("{}{}", self.prefix, FALLBACK_PK_CANDIDATE).to_lowercase();
        warn!(
            "Every primary key candidate collides with a field; falling back to '{}'",
            fallback
        );
        fallback
    }
}

impl Default for PrimaryKeyPolicy {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PK_PREFIX.to_string(),
            candidates: DEFAULT_PK_CANDIDATES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Translates field descriptors into `CREATE TABLE` statements.
pub struct SchemaTranslator {
    mapping: TypeMapping,
    generator: TableGenerator,
    pk_policy: PrimaryKeyPolicy,
    preview: Option<Box<dyn PreviewSink>>,
}

impl SchemaTranslator {
    /// Create a basic-mode translator without previews.
    pub fn new(mapping: TypeMapping) -> Self {
        Self {
            mapping,
            generator: TableGenerator::Basic,
            pk_policy: PrimaryKeyPolicy::default(),
            preview: None,
        }
    }

    /// Create a translator from configuration.
    ///
    /// Uses the configured table mode and primary key policy, and enables a
    /// file preview sink when `features.preview_mode` is set.
    pub fn from_config(config: &Config, mapping: TypeMapping) -> Self {
        let mut translator = Self::new(mapping)
            .with_mode(config.features.table_mode())
            .with_pk_policy(config.translation.pk_policy());

        if config.features.preview_mode {
            translator = translator.with_preview(Box::new(FilePreviewSink::new(
                config.paths.sql_output_directory.clone(),
            )));
        }

        translator
    }

    /// Use the generator for a table mode.
    pub fn with_mode(mut self, mode: TableMode) -> Self {
        self.generator = TableGenerator::for_mode(mode);
        self
    }

    /// Replace the primary key naming policy.
    pub fn with_pk_policy(mut self, policy: PrimaryKeyPolicy) -> Self {
        self.pk_policy = policy;
        self
    }

    /// Write every generated table to a preview sink.
    pub fn with_preview(mut self, sink: Box<dyn PreviewSink>) -> Self {
        self.preview = Some(sink);
        self
    }

    /// Active generator.
    pub fn generator(&self) -> TableGenerator {
        self.generator
    }

    /// Type mapping used for field conversion.
    pub fn mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    /// Mutable access for registering extra type mappings.
    pub fn mapping_mut(&mut self) -> &mut TypeMapping {
        &mut self.mapping
    }

    /// Check if generated tables are written to a preview sink.
    pub fn preview_enabled(&self) -> bool {
        self.preview.is_some()
    }

    /// Primary key name for a set of fields.
    pub fn primary_key_name(&self, fields: &[FieldDescriptor]) -> String {
        let existing: HashSet<String> = fields.iter().map(FieldDescriptor::normalized_name).collect();
        self.pk_policy.choose(&existing)
    }

    /// Reject fields that would repeat a timestamp column or another field.
    ///
    /// Names are compared after lowercasing, as PostgreSQL folds them.
    fn check_column_collisions(
        &self,
        fields: &[FieldDescriptor],
    ) -> std::result::Result<(), ValidationError> {
        let reserved = self.generator.timestamp_columns();
        let mut seen: HashSet<String> = HashSet::with_capacity(fields.len());

        for field in fields {
            let name = field.normalized_name();
            if reserved.contains(&name.as_str()) {
                return Err(ValidationError::DuplicateColumn {
                    name: field.name.clone(),
                    conflict: format!("the {} column added in {} mode", name, self.generator.mode()),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(ValidationError::DuplicateColumn {
                    name: field.name.clone(),
                    conflict: format!("another field named {}", name),
                });
            }
        }

        Ok(())
    }

    /// Translate one table.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty table name, a name that is not a plain
    ///   identifier, a field that repeats another column, or a
    ///   missing/out-of-range length or decimal
    /// - `UnsupportedType` for a type code with no mapping
    /// - `Io` if the preview cannot be written
    ///
    /// Nothing is written to the preview sink unless the whole table translates.
    pub fn generate_table(
        &self,
        table_name: &str,
        fields: &[FieldDescriptor],
    ) -> Result<TableDefinition> {
        validate_table_name(table_name)?;
        validate_column_name(table_name)?;
        for field in fields {
            validate_field_name(field)?;
        }
        self.check_column_collisions(fields)?;

        let primary_key_name = self.primary_key_name(fields);
        validate_column_name(&primary_key_name)?;
        debug!(
            "Generating {} table {} with primary key {}",
            self.generator.mode(),
            table_name,
            primary_key_name
        );

        let schema = self
            .generator
            .build_schema(self, table_name, fields, &primary_key_name)?;
        let ddl = schema.to_ddl();

        let preview = match &self.preview {
            Some(sink) => Some(sink.save_preview(table_name, &ddl)?),
            None => None,
        };

        info!(
            "Generated table {} ({} columns, mode {})",
            table_name,
            schema.columns.len(),
            schema.mode
        );

        Ok(TableDefinition {
            schema,
            ddl: Some(ddl),
            preview,
        })
    }
}

impl FieldTypeConverter for SchemaTranslator {
    fn convert_field_type(&self, field: &FieldDescriptor) -> Result<String> {
        if field.type_code.trim().is_empty() {
            return Err(missing(field, "type").into());
        }

        let length = match field.length {
            None => return Err(missing(field, "length").into()),
            Some(v) if v <= 0 => {
                return Err(invalid(field, "length", v, "must be a positive integer").into())
            }
            Some(v) => u32::try_from(v)
                .map_err(|_| invalid(field, "length", v, "exceeds the supported maximum"))?,
        };

        let decimal = match field.decimal {
            None => return Err(missing(field, "decimal").into()),
            Some(v) if v < 0 => {
                return Err(invalid(field, "decimal", v, "must be a non-negative integer").into())
            }
            Some(v) => u32::try_from(v)
                .map_err(|_| invalid(field, "decimal", v, "exceeds the supported maximum"))?,
        };

        self.mapping.get_type(&field.type_code, length, decimal)
    }
}

impl fmt::Debug for SchemaTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTranslator")
            .field("mapping", &self.mapping)
            .field("generator", &self.generator)
            .field("pk_policy", &self.pk_policy)
            .field("preview", &self.preview.is_some())
            .finish()
    }
}

fn validate_field_name(field: &FieldDescriptor) -> std::result::Result<(), ValidationError> {
    if field.name.trim().is_empty() {
        return Err(ValidationError::MissingAttribute {
            field: "<unnamed>".to_string(),
            attribute: "name".to_string(),
        });
    }
    validate_column_name(&field.name)
}

fn missing(field: &FieldDescriptor, attribute: &str) -> ValidationError {
    ValidationError::MissingAttribute {
        field: field.name.clone(),
        attribute: attribute.to_string(),
    }
}

fn invalid(field: &FieldDescriptor, attribute: &str, value: i64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.name.clone(),
        attribute: attribute.to_string(),
        value,
        reason: reason.to_string(),
    }
}
