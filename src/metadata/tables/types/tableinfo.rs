use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::tables::types::{CodedIndexType, TableId};

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::MAX`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` instance with the given row count.
    ///
    /// Automatically calculates the number of bits required to represent
    /// indices into a table with the specified number of rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            // Safe: 32 - zeros is always <= 32, fits in u8
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Heap-size flags of the tables stream header (II.24.2.6)
pub mod heap_sizes {
    /// Indices into `#Strings` are 4 bytes wide
    pub const LARGE_STRINGS: u8 = 0x01;
    /// Indices into `#GUID` are 4 bytes wide
    pub const LARGE_GUID: u8 = 0x02;
    /// Indices into `#Blob` are 4 bytes wide
    pub const LARGE_BLOB: u8 = 0x04;
}

/// `TableInfo` holds the row count of every table and the resulting width of every reference column.
///
/// This is the input of the schema resolution: it is built once per module from the tables-stream
/// header, before any row is read.
///
/// Width rules (II.24.2.6):
/// - a simple index into table `T` is 4 bytes iff `T` has more than 65535 rows
/// - a coded index with `t` tag bits is 4 bytes iff any candidate table has `2^(16 - t)` rows or more
/// - a heap index is 4 bytes iff the corresponding heap-size flag is set
#[derive(Clone, Debug, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Build a new `TableInfo` from per-table row counts (indexed by table number) and the heap-size
    /// flags byte
    #[must_use]
    pub fn new(row_counts: &[u32; TableId::COUNT], heap_size_flags: u8) -> Self {
        let mut table_info = TableInfo {
            rows: row_counts.iter().map(|rows| TableRowInfo::new(*rows)).collect(),
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & heap_sizes::LARGE_STRINGS != 0,
            is_large_index_guid: heap_size_flags & heap_sizes::LARGE_GUID != 0,
            is_large_index_blob: heap_size_flags & heap_sizes::LARGE_BLOB != 0,
        };

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Build a `TableInfo` from a list of `(table, rows)` pairs; tables not listed have no rows
    #[must_use]
    pub fn from_rows(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut row_counts = [0_u32; TableId::COUNT];
        for (table, rows) in valid_tables {
            row_counts[*table as usize] = *rows;
        }

        let mut flags = 0;
        if large_str {
            flags |= heap_sizes::LARGE_STRINGS;
        }
        if large_guid {
            flags |= heap_sizes::LARGE_GUID;
        }
        if large_blob {
            flags |= heap_sizes::LARGE_BLOB;
        }

        TableInfo::new(&row_counts, flags)
    }

    /// Returns the metadata for a specific table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Number of rows of `table`
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Returns true, if a requested table is larger than 2^16 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#Strings' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the '#GUID' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Width in bytes of a '#Strings' heap index
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Width in bytes of a '#GUID' heap index
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Width in bytes of a '#Blob' heap index
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Width in bytes of a simple index into `table_id`
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached bit size for a specific coded index type.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Width in bytes of a coded index of `coded_index_type`
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .map(|table| self.rows[table as usize].bits)
            .max()
            .unwrap_or(1);

        max_bits + coded_index_type.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_index_boundary() {
        let at = TableInfo::from_rows(&[(TableId::Field, 0xFFFF)], false, false, false);
        assert_eq!(at.table_index_bytes(TableId::Field), 2);
        assert!(!at.is_large(TableId::Field));

        let below = TableInfo::from_rows(&[(TableId::Field, 0xFFFE)], false, false, false);
        assert_eq!(below.table_index_bytes(TableId::Field), 2);

        let above = TableInfo::from_rows(&[(TableId::Field, 0x1_0000)], false, false, false);
        assert_eq!(above.table_index_bytes(TableId::Field), 4);
        assert!(above.is_large(TableId::Field));
    }

    #[test]
    fn coded_index_boundary() {
        // TypeDefOrRef has 2 tag bits, so 2^14 rows in any candidate is the first 4 byte size
        let threshold = 1_u32 << 14;
        for (rows, expected) in [(threshold - 1, 2), (threshold, 4), (threshold + 1, 4)] {
            let info = TableInfo::from_rows(&[(TableId::TypeRef, rows)], false, false, false);
            assert_eq!(
                info.coded_index_bytes(CodedIndexType::TypeDefOrRef),
                expected,
                "rows = {rows}"
            );
            assert_eq!(info.table_index_bytes(TableId::TypeRef), 2);
        }

        // HasFieldMarshal has 1 tag bit
        let threshold = 1_u32 << 15;
        let info = TableInfo::from_rows(&[(TableId::Param, threshold - 1)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasFieldMarshal), 2);
        let info = TableInfo::from_rows(&[(TableId::Param, threshold)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasFieldMarshal), 4);
    }

    #[test]
    fn heap_flags() {
        let info = TableInfo::new(&[0; TableId::COUNT], heap_sizes::LARGE_BLOB);
        assert_eq!(info.str_bytes(), 2);
        assert_eq!(info.guid_bytes(), 2);
        assert_eq!(info.blob_bytes(), 4);

        let info = TableInfo::from_rows(&[], true, false, true);
        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.blob_bytes(), 2);
        assert_eq!(info.guid_bytes(), 4);
    }

    #[test]
    fn empty_tables_are_narrow() {
        let info = TableInfo::from_rows(&[], false, false, false);
        assert_eq!(info.rows(TableId::TypeDef), 0);
        assert_eq!(info.table_index_bytes(TableId::TypeDef), 2);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasCustomAttribute), 2);
    }
}
