//! Table schema resolution.
//!
//! Every metadata table is a sequence of fixed-size rows, but the size of a row is only known once
//! the row counts of all tables and the heap-size flags are known: references into other tables and
//! heaps are 2 or 4 bytes wide depending on them. [`TableSchemas::resolve`] runs once per module,
//! right after the tables-stream header has been read, and produces for every table the ordered list
//! of its columns, each bound to a decoder of the right width.
//!
//! The column layouts follow ECMA-335 Partition II, chapter 22.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilnorm::metadata::tables::{TableId, TableInfo, TableSchemas};
//!
//! let rows = [(TableId::Field, 3), (TableId::FieldLayout, 1)];
//! let info = TableInfo::from_rows(&rows, false, false, false);
//! let schemas = TableSchemas::resolve(Arc::new(info))?;
//! // Offset (4) + Field index (2)
//! assert_eq!(schemas.get(TableId::FieldLayout).row_size, 6);
//! # Ok::<(), cilnorm::Error>(())
//! ```

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::parser::Parser,
    metadata::{
        tables::types::{CodedIndexType, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// The most columns any table has (`Assembly`, `AssemblyRef`)
pub const MAX_COLUMNS: usize = 9;

/// What a column stores, which determines its width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// A constant of the given byte width (1, 2 or 4)
    Fixed(u8),
    /// A 1-based row index into a single table
    Table(TableId),
    /// A tagged row index into one of several tables
    Coded(CodedIndexType),
    /// An offset into the `#Strings` heap
    Strings,
    /// An offset into the `#Blob` heap
    Blob,
    /// A 1-based index into the `#GUID` heap
    Guid,
}

/// Reads one column value and widens it to `u32`
pub type ColumnDecoder = fn(&mut Parser<'_>) -> Result<u32>;

fn decode_u8(parser: &mut Parser<'_>) -> Result<u32> {
    Ok(u32::from(parser.read_le::<u8>()?))
}

fn decode_u16(parser: &mut Parser<'_>) -> Result<u32> {
    Ok(u32::from(parser.read_le::<u16>()?))
}

fn decode_u32(parser: &mut Parser<'_>) -> Result<u32> {
    parser.read_le::<u32>()
}

/// A column with its resolved width and bound decoder
#[derive(Clone, Copy, Debug)]
pub struct ColumnSchema {
    /// Column name as used in ECMA-335
    pub name: &'static str,
    /// What the column refers to
    pub kind: ColumnKind,
    /// Resolved width in bytes
    pub width: u8,
    decoder: ColumnDecoder,
}

impl ColumnSchema {
    fn bind(name: &'static str, kind: ColumnKind, width: u8) -> Result<Self> {
        let decoder: ColumnDecoder = match width {
            1 => decode_u8,
            2 => decode_u16,
            4 => decode_u32,
            _ => {
                return Err(malformed_error!(
                    "Column {} has an unsupported width of {} bytes",
                    name,
                    width
                ))
            }
        };

        Ok(ColumnSchema {
            name,
            kind,
            width,
            decoder,
        })
    }

    /// Decode this column at the cursor's position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row data ends early
    pub fn decode(&self, parser: &mut Parser<'_>) -> Result<u32> {
        (self.decoder)(parser)
    }
}

/// The resolved layout of one table
#[derive(Clone, Debug)]
pub struct TableSchema {
    /// The table described
    pub table: TableId,
    /// Columns in storage order
    pub columns: Vec<ColumnSchema>,
    /// Sum of all column widths
    pub row_size: usize,
}

impl TableSchema {
    /// Index of the column called `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Decode all columns of the row at the cursor
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `row_size` bytes remain
    pub fn read_row<'s>(&'s self, parser: &mut Parser<'_>, rid: u32) -> Result<RowData<'s>> {
        let mut values = [0_u32; MAX_COLUMNS];
        for (slot, column) in values.iter_mut().zip(&self.columns) {
            *slot = column.decode(parser)?;
        }

        Ok(RowData {
            rid,
            values,
            schema: self,
        })
    }
}

/// The decoded column values of a single row
#[derive(Clone, Copy, Debug)]
pub struct RowData<'s> {
    /// 1-based row index
    pub rid: u32,
    values: [u32; MAX_COLUMNS],
    schema: &'s TableSchema,
}

impl RowData<'_> {
    /// The table this row belongs to
    #[must_use]
    pub fn table(&self) -> TableId {
        self.schema.table
    }

    /// The token of this row
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(self.schema.table, self.rid)
    }

    /// Raw value of column `column`
    ///
    /// # Errors
    /// Returns an error if the table has no such column
    pub fn value(&self, column: usize) -> Result<u32> {
        if column >= self.schema.columns.len() {
            return Err(malformed_error!(
                "Table {} has no column {}",
                self.schema.table,
                column
            ));
        }
        Ok(self.values[column])
    }

    /// Kind of column `column`
    ///
    /// # Errors
    /// Returns an error if the table has no such column
    pub fn kind(&self, column: usize) -> Result<ColumnKind> {
        self.schema
            .columns
            .get(column)
            .map(|c| c.kind)
            .ok_or_else(|| malformed_error!("Table {} has no column {}", self.schema.table, column))
    }
}

/// Column layout of `table` as defined by ECMA-335 II.22
#[must_use]
pub fn columns(table: TableId) -> &'static [(&'static str, ColumnKind)] {
    use ColumnKind::{Blob, Coded, Fixed, Guid, Strings, Table};
    use CodedIndexType as C;

    match table {
        TableId::Module => &[
            ("Generation", Fixed(2)),
            ("Name", Strings),
            ("Mvid", Guid),
            ("EncId", Guid),
            ("EncBaseId", Guid),
        ],
        TableId::TypeRef => &[
            ("ResolutionScope", Coded(C::ResolutionScope)),
            ("TypeName", Strings),
            ("TypeNamespace", Strings),
        ],
        TableId::TypeDef => &[
            ("Flags", Fixed(4)),
            ("TypeName", Strings),
            ("TypeNamespace", Strings),
            ("Extends", Coded(C::TypeDefOrRef)),
            ("FieldList", Table(TableId::Field)),
            ("MethodList", Table(TableId::MethodDef)),
        ],
        TableId::FieldPtr => &[("Field", Table(TableId::Field))],
        TableId::Field => &[("Flags", Fixed(2)), ("Name", Strings), ("Signature", Blob)],
        TableId::MethodPtr => &[("Method", Table(TableId::MethodDef))],
        TableId::MethodDef => &[
            ("RVA", Fixed(4)),
            ("ImplFlags", Fixed(2)),
            ("Flags", Fixed(2)),
            ("Name", Strings),
            ("Signature", Blob),
            ("ParamList", Table(TableId::Param)),
        ],
        TableId::ParamPtr => &[("Param", Table(TableId::Param))],
        TableId::Param => &[("Flags", Fixed(2)), ("Sequence", Fixed(2)), ("Name", Strings)],
        TableId::InterfaceImpl => &[
            ("Class", Table(TableId::TypeDef)),
            ("Interface", Coded(C::TypeDefOrRef)),
        ],
        TableId::MemberRef => &[
            ("Class", Coded(C::MemberRefParent)),
            ("Name", Strings),
            ("Signature", Blob),
        ],
        TableId::Constant => &[
            ("Type", Fixed(1)),
            ("Padding", Fixed(1)),
            ("Parent", Coded(C::HasConstant)),
            ("Value", Blob),
        ],
        TableId::CustomAttribute => &[
            ("Parent", Coded(C::HasCustomAttribute)),
            ("Type", Coded(C::CustomAttributeType)),
            ("Value", Blob),
        ],
        TableId::FieldMarshal => &[("Parent", Coded(C::HasFieldMarshal)), ("NativeType", Blob)],
        TableId::DeclSecurity => &[
            ("Action", Fixed(2)),
            ("Parent", Coded(C::HasDeclSecurity)),
            ("PermissionSet", Blob),
        ],
        TableId::ClassLayout => &[
            ("PackingSize", Fixed(2)),
            ("ClassSize", Fixed(4)),
            ("Parent", Table(TableId::TypeDef)),
        ],
        TableId::FieldLayout => &[("Offset", Fixed(4)), ("Field", Table(TableId::Field))],
        TableId::StandAloneSig => &[("Signature", Blob)],
        TableId::EventMap => &[
            ("Parent", Table(TableId::TypeDef)),
            ("EventList", Table(TableId::Event)),
        ],
        TableId::EventPtr => &[("Event", Table(TableId::Event))],
        TableId::Event => &[
            ("EventFlags", Fixed(2)),
            ("Name", Strings),
            ("EventType", Coded(C::TypeDefOrRef)),
        ],
        TableId::PropertyMap => &[
            ("Parent", Table(TableId::TypeDef)),
            ("PropertyList", Table(TableId::Property)),
        ],
        TableId::PropertyPtr => &[("Property", Table(TableId::Property))],
        TableId::Property => &[("Flags", Fixed(2)), ("Name", Strings), ("Type", Blob)],
        TableId::MethodSemantics => &[
            ("Semantics", Fixed(2)),
            ("Method", Table(TableId::MethodDef)),
            ("Association", Coded(C::HasSemantics)),
        ],
        TableId::MethodImpl => &[
            ("Class", Table(TableId::TypeDef)),
            ("MethodBody", Coded(C::MethodDefOrRef)),
            ("MethodDeclaration", Coded(C::MethodDefOrRef)),
        ],
        TableId::ModuleRef => &[("Name", Strings)],
        TableId::TypeSpec => &[("Signature", Blob)],
        TableId::ImplMap => &[
            ("MappingFlags", Fixed(2)),
            ("MemberForwarded", Coded(C::MemberForwarded)),
            ("ImportName", Strings),
            ("ImportScope", Table(TableId::ModuleRef)),
        ],
        TableId::FieldRVA => &[("RVA", Fixed(4)), ("Field", Table(TableId::Field))],
        TableId::EncLog => &[("Token", Fixed(4)), ("FuncCode", Fixed(4))],
        TableId::EncMap => &[("Token", Fixed(4))],
        TableId::Assembly => &[
            ("HashAlgId", Fixed(4)),
            ("MajorVersion", Fixed(2)),
            ("MinorVersion", Fixed(2)),
            ("BuildNumber", Fixed(2)),
            ("RevisionNumber", Fixed(2)),
            ("Flags", Fixed(4)),
            ("PublicKey", Blob),
            ("Name", Strings),
            ("Culture", Strings),
        ],
        TableId::AssemblyProcessor => &[("Processor", Fixed(4))],
        TableId::AssemblyOS => &[
            ("OSPlatformID", Fixed(4)),
            ("OSMajorVersion", Fixed(4)),
            ("OSMinorVersion", Fixed(4)),
        ],
        TableId::AssemblyRef => &[
            ("MajorVersion", Fixed(2)),
            ("MinorVersion", Fixed(2)),
            ("BuildNumber", Fixed(2)),
            ("RevisionNumber", Fixed(2)),
            ("Flags", Fixed(4)),
            ("PublicKeyOrToken", Blob),
            ("Name", Strings),
            ("Culture", Strings),
            ("HashValue", Blob),
        ],
        TableId::AssemblyRefProcessor => &[
            ("Processor", Fixed(4)),
            ("AssemblyRef", Table(TableId::AssemblyRef)),
        ],
        TableId::AssemblyRefOS => &[
            ("OSPlatformID", Fixed(4)),
            ("OSMajorVersion", Fixed(4)),
            ("OSMinorVersion", Fixed(4)),
            ("AssemblyRef", Table(TableId::AssemblyRef)),
        ],
        TableId::File => &[("Flags", Fixed(4)), ("Name", Strings), ("HashValue", Blob)],
        TableId::ExportedType => &[
            ("Flags", Fixed(4)),
            ("TypeDefId", Fixed(4)),
            ("TypeName", Strings),
            ("TypeNamespace", Strings),
            ("Implementation", Coded(C::Implementation)),
        ],
        TableId::ManifestResource => &[
            ("Offset", Fixed(4)),
            ("Flags", Fixed(4)),
            ("Name", Strings),
            ("Implementation", Coded(C::Implementation)),
        ],
        TableId::NestedClass => &[
            ("NestedClass", Table(TableId::TypeDef)),
            ("EnclosingClass", Table(TableId::TypeDef)),
        ],
        TableId::GenericParam => &[
            ("Number", Fixed(2)),
            ("Flags", Fixed(2)),
            ("Owner", Coded(C::TypeOrMethodDef)),
            ("Name", Strings),
        ],
        TableId::MethodSpec => &[
            ("Method", Coded(C::MethodDefOrRef)),
            ("Instantiation", Blob),
        ],
        TableId::GenericParamConstraint => &[
            ("Owner", Table(TableId::GenericParam)),
            ("Constraint", Coded(C::TypeDefOrRef)),
        ],
    }
}

/// The resolved schemas of all tables of one module
#[derive(Clone, Debug)]
pub struct TableSchemas {
    info: TableInfoRef,
    tables: Vec<TableSchema>,
}

impl TableSchemas {
    /// Resolve the width of every column of every table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a table with rows depends on tables that are all absent
    pub fn resolve(info: TableInfoRef) -> Result<Self> {
        for table in TableId::iter() {
            if info.rows(table) == 0 {
                continue;
            }

            let required = table.requires();
            if !required.is_empty() && required.iter().all(|other| info.rows(*other) == 0) {
                return Err(malformed_error!(
                    "Table {} has {} rows but the tables it references ({:?}) are absent",
                    table,
                    info.rows(table),
                    required
                ));
            }
        }

        let mut tables = Vec::with_capacity(TableId::COUNT);
        for table in TableId::iter() {
            let mut resolved = Vec::with_capacity(MAX_COLUMNS);
            let mut row_size = 0_usize;

            for &(name, kind) in columns(table) {
                let width = match kind {
                    ColumnKind::Fixed(width) => width,
                    ColumnKind::Table(target) => info.table_index_bytes(target),
                    ColumnKind::Coded(coded) => info.coded_index_bytes(coded),
                    ColumnKind::Strings => info.str_bytes(),
                    ColumnKind::Blob => info.blob_bytes(),
                    ColumnKind::Guid => info.guid_bytes(),
                };

                row_size += usize::from(width);
                resolved.push(ColumnSchema::bind(name, kind, width)?);
            }

            tables.push(TableSchema {
                table,
                columns: resolved,
                row_size,
            });
        }

        Ok(TableSchemas { info, tables })
    }

    /// The schema of `table`
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableSchema {
        &self.tables[table as usize]
    }

    /// The row counts and widths the schemas were resolved from
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// Total byte size of `table`'s rows
    #[must_use]
    pub fn table_size(&self, table: TableId) -> usize {
        self.get(table).row_size * self.info.rows(table) as usize
    }
}
