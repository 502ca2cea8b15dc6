//! Header of the `#~` tables stream (II.24.2.6).
//!
//! ```text
//! offset  size  field
//!      0     4  reserved, always 0
//!      4     1  major version
//!      5     1  minor version
//!      6     1  heap-size flags
//!      7     1  reserved, always 1
//!      8     8  valid: bitmap of present tables
//!     16     8  sorted: bitmap of sorted tables
//!     24   4*n  row count of each present table, in table order
//! ```
//!
//! The row data of all present tables follows directly, table after table. Reading the header yields
//! the [`TableInfo`] that drives schema resolution, and the offset of each table's rows.

use std::sync::Arc;

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::parser::Parser,
    metadata::tables::{TableId, TableInfo, TableInfoRef, TableSchemas},
    Result,
};

/// Versions of the tables stream that can be imported
pub const SUPPORTED_VERSIONS: [(u8, u8); 3] = [(1, 0), (1, 1), (2, 0)];

/// Parsed tables-stream header together with the resolved schemas
#[derive(Clone, Debug)]
pub struct TablesHeader<'a> {
    /// Major version of the table schemata
    pub major_version: u8,
    /// Minor version of the table schemata
    pub minor_version: u8,
    /// Heap-size flags
    pub heap_sizes: u8,
    /// Bitmap of present tables
    pub valid: u64,
    /// Bitmap of sorted tables
    pub sorted: u64,
    /// Row counts and column widths
    pub info: TableInfoRef,
    /// Resolved table layouts
    pub schemas: TableSchemas,
    table_offsets: [usize; TableId::COUNT],
    data: &'a [u8],
}

impl<'a> TablesHeader<'a> {
    /// Parse the header, resolve all table schemas and locate every table's rows.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unsupported version, a non-zero reserved field, an
    /// empty or unknown bit in the presence bitmap, an inconsistent bitmap, or row data that does not
    /// fit into the stream
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        let mut parser = Parser::new(data);

        let reserved = parser.read_le::<u32>()?;
        if reserved != 0 {
            return Err(malformed_error!(
                "Tables stream reserved field is {:#x} instead of 0",
                reserved
            ));
        }

        let major_version = parser.read_le::<u8>()?;
        let minor_version = parser.read_le::<u8>()?;
        if !SUPPORTED_VERSIONS.contains(&(major_version, minor_version)) {
            return Err(malformed_error!(
                "Unsupported tables stream version {}.{}",
                major_version,
                minor_version
            ));
        }

        let heap_sizes = parser.read_le::<u8>()?;
        let _rid_size = parser.read_le::<u8>()?;
        let valid = parser.read_le::<u64>()?;
        let sorted = parser.read_le::<u64>()?;

        if valid == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        let known_tables = (1_u64 << TableId::COUNT) - 1;
        if valid & !known_tables != 0 {
            return Err(malformed_error!(
                "Presence bitmap {:#018x} names undefined tables",
                valid
            ));
        }

        let mut row_counts = [0_u32; TableId::COUNT];
        for table in TableId::iter() {
            if valid & (1 << table as u64) != 0 {
                row_counts[table as usize] = parser.read_le::<u32>()?;
            }
        }

        let info = Arc::new(TableInfo::new(&row_counts, heap_sizes));
        let schemas = TableSchemas::resolve(info.clone())?;

        let mut table_offsets = [0_usize; TableId::COUNT];
        let mut offset = parser.pos();
        for table in TableId::iter() {
            table_offsets[table as usize] = offset;
            offset = offset
                .checked_add(schemas.table_size(table))
                .ok_or_else(|| malformed_error!("Table {} size overflows", table))?;
        }

        if offset > data.len() {
            return Err(malformed_error!(
                "Table rows need {} bytes but the tables stream has only {}",
                offset,
                data.len()
            ));
        }

        Ok(TablesHeader {
            major_version,
            minor_version,
            heap_sizes,
            valid,
            sorted,
            info,
            schemas,
            table_offsets,
            data,
        })
    }

    /// Number of tables present in the bitmap
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// True if `table` is marked present
    #[must_use]
    pub fn has_table(&self, table: TableId) -> bool {
        self.valid & (1 << table as u64) != 0
    }

    /// The row bytes of `table`
    #[must_use]
    pub fn table_data(&self, table: TableId) -> &'a [u8] {
        let start = self.table_offsets[table as usize];
        &self.data[start..start + self.schemas.table_size(table)]
    }

    /// The raw bytes of row `rid` (1-based) of `table`, if it exists
    #[must_use]
    pub fn row_data(&self, table: TableId, rid: u32) -> Option<&'a [u8]> {
        if rid == 0 || rid > self.info.rows(table) {
            return None;
        }

        let row_size = self.schemas.get(table).row_size;
        let start = self.table_offsets[table as usize] + (rid as usize - 1) * row_size;
        Some(&self.data[start..start + row_size])
    }
}
