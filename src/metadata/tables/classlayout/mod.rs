//! The `ClassLayout` table (II.22.8): explicit packing and size of a type.

mod loader;
mod owned;

pub use owned::*;
