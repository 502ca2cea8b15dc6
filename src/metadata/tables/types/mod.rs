//! # Metadata Table Types Module
//!
//! The infrastructure shared by all modeled tables:
//!
//! - [`TableId`], [`CodedIndexType`] and [`CodedIndex`]: table numbering and compact cross-table
//!   references
//! - [`TableInfo`] and [`TableSchemas`]: row counts, column widths and the bound column decoders
//! - [`RowContent`], [`MetadataObject`] and [`MetadataTable`]: the two-step object model. Every row
//!   of a modeled table gets a placeholder before any row is decoded; the placeholder is filled
//!   later and can be referenced by token in between.
//!
//! ## References
//!
//! - ECMA-335 6th Edition, Partition II, Section 22

mod codedindex;
mod object;
mod schema;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType, CodedIndexTypeIter};
pub use object::{MetadataObject, MetadataTable, RowContent};
pub use schema::{
    columns, ColumnKind, ColumnSchema, RowData, TableSchema, TableSchemas, MAX_COLUMNS,
};
pub use tableid::TableId;
pub use tableinfo::{heap_sizes, TableInfo, TableInfoRef, TableRowInfo};

pub(crate) use object::register_link;
