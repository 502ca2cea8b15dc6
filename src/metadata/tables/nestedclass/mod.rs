//! The `NestedClass` table (II.22.32).
//!
//! Each row registers the enclosing type on the nested one, see
//! [`crate::metadata::tables::MetadataObject::enclosing_type`].

mod loader;
mod owned;

pub use owned::*;
