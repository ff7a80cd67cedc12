//! DBF header metadata.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::FieldDescriptor;

/// Size of the main header and of each field descriptor.
pub const BLOCK_SIZE: usize = 32;

/// Marks the end of the field descriptor array.
pub const FIELD_TERMINATOR: u8 = 0x0D;

/// Parsed DBF header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbfHeader {
    /// Version byte.
    pub version: u8,

    /// Date of last update, when the header carries a valid one.
    pub last_update: Option<NaiveDate>,

    /// Number of records.
    pub record_count: u32,

    /// Header length in bytes, including field descriptors.
    pub header_length: u16,

    /// Record length in bytes, including the deletion flag.
    pub record_length: u16,

    /// Field descriptors in file order.
    pub fields: Vec<FieldDescriptor>,
}

impl DbfHeader {
    /// Human-readable name of the producing dBASE dialect.
    pub fn version_name(&self) -> &'static str {
        version_name(self.version)
    }

    /// Sum of the declared field lengths.
    pub fn declared_record_width(&self) -> i64 {
        self.fields.iter().filter_map(|f| f.length).sum()
    }
}

/// Check if the version byte marks a dBASE 7 file (level 4 in the low bits).
///
/// These use 48-byte field descriptors with 32-byte names.
pub fn is_dbase7(version: u8) -> bool {
    version & 0x07 == 0x04
}

/// Map a version byte to a dialect name.
pub fn version_name(version: u8) -> &'static str {
    match version {
        0x02 => "FoxBASE",
        0x03 => "dBASE III",
        0x04 => "dBASE 7",
        0x05 => "dBASE V",
        0x30 | 0x31 | 0x32 => "Visual FoxPro",
        0x43 | 0x63 => "dBASE IV SQL",
        0x83 => "dBASE III with memo",
        0x8B => "dBASE IV with memo",
        0x8C => "dBASE 7 with memo",
        0x8E => "dBASE IV with SQL table",
        0xF5 => "FoxPro with memo",
        0xFB => "FoxBASE",
        _ => "unknown",
    }
}
