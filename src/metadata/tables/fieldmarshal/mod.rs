//! The `FieldMarshal` table (II.22.17): native marshaling of fields and parameters.
//!
//! Each row registers itself on its parent, see [`crate::metadata::tables::Field`] and
//! [`crate::metadata::tables::Param`].

mod loader;
mod owned;

pub use owned::*;
