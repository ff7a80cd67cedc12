//! Field exclusion filtering.
//!
//! A [`FieldFilter`] starts out unconfigured and refuses to filter until
//! [`FieldFilter::configure`] has been called. Names are compared
//! case-insensitively.
//!
//! Removing the last excluded name with
//! [`FieldFilter::remove_excluded_field`] puts the filter back into the
//! unconfigured state, and so does [`FieldFilter::clear_excluded_fields`].
//! Callers that un-exclude a field must call `configure` again before
//! filtering.
//!
//! ```rust
//! use dbf_pg_schema::{FieldDescriptor, FieldFilter};
//!
//! let fields = vec![
//!     FieldDescriptor::new("CODIGO", "N", 6, 0),
//!     FieldDescriptor::new("SENHA", "C", 10, 0),
//! ];
//!
//! let mut filter = FieldFilter::new();
//! filter.add_excluded_field("senha").configure();
//!
//! let kept = filter.included_fields(&fields).unwrap();
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].name, "CODIGO");
//! ```

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::FieldDescriptor;
use crate::error::{Result, SchemaError};

/// Whether a filter is ready to be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusionState {
    /// `configure` has not been called, or the exclusion set was emptied.
    #[default]
    Unconfigured,
    /// Ready to filter.
    Configured,
}

/// Case-insensitive set of field names to drop from generated tables.
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    excluded: BTreeSet<String>,
    state: ExclusionState,
}

impl FieldFilter {
    /// Create an unconfigured filter with no exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude a field. Adding a name twice has no effect.
    pub fn add_excluded_field(&mut self, name: &str) -> &mut Self {
        let name = name.to_lowercase();
        if self.excluded.insert(name.clone()) {
            debug!("Excluding field '{}'", name);
        }
        self
    }

    /// Stop excluding a field.
    ///
    /// If this empties the exclusion set the filter reverts to
    /// [`ExclusionState::Unconfigured`].
    pub fn remove_excluded_field(&mut self, name: &str) -> &mut Self {
        let name = name.to_lowercase();
        if self.excluded.remove(&name) {
            debug!("Field '{}' no longer excluded", name);
            if self.excluded.is_empty() {
                self.state = ExclusionState::Unconfigured;
            }
        }
        self
    }

    /// Remove every exclusion and return to the unconfigured state.
    pub fn clear_excluded_fields(&mut self) -> &mut Self {
        self.excluded.clear();
        self.state = ExclusionState::Unconfigured;
        self
    }

    /// Mark the filter ready, even if nothing is excluded.
    pub fn configure(&mut self) -> &mut Self {
        self.state = ExclusionState::Configured;
        self
    }

    /// Add the given names to the exclusion set, then mark the filter ready.
    pub fn configure_with<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_excluded_field(name.as_ref());
        }
        self.configure()
    }

    /// Fields whose names are not excluded, in their original order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotConfigured` if `configure` has not been called
    /// since the filter was created or last emptied.
    pub fn included_fields(&self, fields: &[FieldDescriptor]) -> Result<Vec<FieldDescriptor>> {
        if self.state == ExclusionState::Unconfigured {
            return Err(SchemaError::NotConfigured);
        }

        let kept: Vec<FieldDescriptor> = fields
            .iter()
            .filter(|f| !self.excluded.contains(&f.normalized_name()))
            .cloned()
            .collect();

        debug!(
            "Field filter kept {} of {} fields",
            kept.len(),
            fields.len()
        );
        Ok(kept)
    }

    /// Current state.
    pub fn state(&self) -> ExclusionState {
        self.state
    }

    /// Check if the filter is ready to be queried.
    pub fn is_configured(&self) -> bool {
        self.state == ExclusionState::Configured
    }

    /// Check if a field name is excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(&name.to_lowercase())
    }

    /// Excluded names (lowercase, sorted).
    pub fn excluded_fields(&self) -> Vec<&str> {
        self.excluded.iter().map(String::as_str).collect()
    }
}
