//! The `TypeSpec` table (II.22.39): constructed types such as arrays, pointers and generic
//! instantiations.

mod loader;
mod owned;

pub use owned::*;
