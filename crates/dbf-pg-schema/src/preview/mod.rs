//! SQL preview artifacts.
//!
//! When preview mode is on, generated DDL is also written to a timestamped
//! `.sql` file so it can be reviewed before anything touches the database.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::Result;

/// Destination for generated DDL previews.
pub trait PreviewSink {
    /// Persist the DDL for a table and return the artifact location.
    fn save_preview(&self, table_name: &str, ddl: &str) -> Result<PathBuf>;
}

/// Writes previews as `<table>_<YYYYmmdd_HHMMSS>[_<suffix>].sql` files.
#[derive(Debug, Clone)]
pub struct FilePreviewSink {
    output_dir: PathBuf,
    suffix: Option<String>,
}

impl FilePreviewSink {
    /// Create a sink writing into `output_dir`. The directory is created on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            suffix: None,
        }
    }

    /// Append a suffix to every file name.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Directory previews are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_stem(&self, table_name: &str, now: &DateTime<Local>) -> String {
        let mut stem = format!("{}_{}", table_name, now.format("%Y%m%d_%H%M%S"));
        if let Some(suffix) = &self.suffix {
            stem.push('_');
            stem.push_str(suffix);
        }
        stem
    }

    /// Create a new file, adding `_1`, `_2`, ... if the name is taken.
    fn create_unique(&self, stem: &str) -> Result<(PathBuf, fs::File)> {
        let mut attempt = 0u32;
        loop {
            let file_name = if attempt == 0 {
                format!("{}.sql", stem)
            } else {
                format!("{}_{}.sql", stem, attempt)
            };
            let path = self.output_dir.join(file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl PreviewSink for FilePreviewSink {
    fn save_preview(&self, table_name: &str, ddl: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let now = Local::now();
        let (path, mut file) = self.create_unique(&self.file_stem(table_name, &now))?;
        file.write_all(render_preview(table_name, ddl, &now).as_bytes())?;

        info!("Wrote SQL preview for {} to {}", table_name, path.display());
        Ok(path)
    }
}

/// Preview file contents: a two-line comment header, a blank line, then the DDL.
pub fn render_preview(table_name: &str, ddl: &str, generated_at: &DateTime<Local>) -> String {
    format!(
        "-- SQL Preview generated for table: {}\n-- Generated at: {}\n\n{}",
        table_name,
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        ddl
    )
}
