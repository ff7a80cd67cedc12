//! DBF source files.
//!
//! Only the header is read: the 32-byte main header followed by 32-byte field
//! descriptors up to the `0x0D` terminator. Records are never touched.
//! dBASE 7 files, whose descriptors are 48 bytes wide, are rejected.

mod types;

pub use types::*;

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::core::identifier::sanitize_table_name;
use crate::core::FieldDescriptor;
use crate::error::{Result, SchemaError};

/// Required file extension (compared case-insensitively).
pub const DBF_EXTENSION: &str = "dbf";

/// An opened DBF file and its parsed header.
#[derive(Debug, Clone)]
pub struct DbfSource {
    path: PathBuf,
    header: DbfHeader,
}

impl DbfSource {
    /// Open a DBF file and parse its header.
    ///
    /// # Errors
    ///
    /// - `Io` if the file does not exist or cannot be read
    /// - `DbfFormat` for a wrong extension or a malformed header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_path(path)?;

        let file = File::open(path)?;
        let header = read_header(path, BufReader::new(file))?;

        info!(
            "Opened {} ({}, {} fields, {} records)",
            path.display(),
            header.version_name(),
            header.fields.len(),
            header.record_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            header,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed header.
    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    /// Field descriptors in file order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.header.fields
    }

    /// Table name derived from the file stem.
    pub fn table_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        sanitize_table_name(&stem)
    }
}

fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SchemaError::Io(std::io::Error::new(
            ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let is_dbf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(DBF_EXTENSION))
        .unwrap_or(false);
    if !is_dbf {
        return Err(SchemaError::dbf_format(path, "expected a .dbf file"));
    }

    Ok(())
}

/// Parse a DBF header from a reader positioned at the start of the file.
pub fn read_header<R: Read>(path: &Path, mut reader: R) -> Result<DbfHeader> {
    let mut main = [0u8; BLOCK_SIZE];
    read_block(path, &mut reader, &mut main, "main header")?;

    let version = main[0];
    if is_dbase7(version) {
        return Err(SchemaError::dbf_format(
            path,
            format!(
                "{} (0x{:02X}) uses 48-byte field descriptors, which are not supported",
                version_name(version),
                version
            ),
        ));
    }
    let last_update = NaiveDate::from_ymd_opt(
        1900 + i32::from(main[1]),
        u32::from(main[2]),
        u32::from(main[3]),
    );
    let record_count = u32::from_le_bytes([main[4], main[5], main[6], main[7]]);
    let header_length = u16::from_le_bytes([main[8], main[9]]);
    let record_length = u16::from_le_bytes([main[10], main[11]]);

    if usize::from(header_length) < BLOCK_SIZE + 1 {
        return Err(SchemaError::dbf_format(
            path,
            format!("header length {} is too small", header_length),
        ));
    }

    let max_fields = (usize::from(header_length) - BLOCK_SIZE - 1) / BLOCK_SIZE;
    let mut fields = Vec::new();

    loop {
        let mut first = [0u8; 1];
        read_block(path, &mut reader, &mut first, "field descriptor terminator")?;
        if first[0] == FIELD_TERMINATOR {
            break;
        }

        if fields.len() >= max_fields {
            return Err(SchemaError::dbf_format(
                path,
                format!(
                    "more field descriptors than header length {} allows",
                    header_length
                ),
            ));
        }

        let mut descriptor = [0u8; BLOCK_SIZE];
        descriptor[0] = first[0];
        read_block(path, &mut reader, &mut descriptor[1..], "field descriptor")?;
        fields.push(parse_field(path, fields.len(), &descriptor)?);
    }

    if fields.is_empty() {
        warn!("{} declares no fields", path.display());
    }

    let header = DbfHeader {
        version,
        last_update,
        record_count,
        header_length,
        record_length,
        fields,
    };

    // Record length includes the one-byte deletion flag.
    let expected = header.declared_record_width() + 1;
    if i64::from(record_length) != expected {
        debug!(
            "{}: record length {} differs from declared field widths ({})",
            path.display(),
            record_length,
            expected
        );
    }

    Ok(header)
}

fn read_block<R: Read>(path: &Path, reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            SchemaError::dbf_format(path, format!("truncated {}", what))
        } else {
            SchemaError::Io(e)
        }
    })
}

fn parse_field(path: &Path, index: usize, raw: &[u8; BLOCK_SIZE]) -> Result<FieldDescriptor> {
    let name_bytes = &raw[..11];
    let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
    // Names are single-byte encoded; map each byte to its Latin-1 code point.
    let name: String = name_bytes[..name_end].iter().map(|&b| b as char).collect();
    let name = name.trim().to_string();

    if name.is_empty() {
        return Err(SchemaError::dbf_format(
            path,
            format!("field {} has an empty name", index + 1),
        ));
    }

    let type_byte = raw[11];
    if !type_byte.is_ascii_graphic() {
        return Err(SchemaError::dbf_format(
            path,
            format!("field {} has invalid type byte 0x{:02X}", name, type_byte),
        ));
    }

    Ok(FieldDescriptor::new(
        name,
        (type_byte as char).to_string(),
        i64::from(raw[16]),
        i64::from(raw[17]),
    ))
}
