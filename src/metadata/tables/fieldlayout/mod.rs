//! The `FieldLayout` table (II.22.16): explicit byte offsets of fields.

mod loader;
mod owned;

pub use owned::*;
