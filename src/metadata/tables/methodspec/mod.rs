//! The `MethodSpec` table (II.22.29): instantiations of generic methods.

mod loader;
mod owned;

pub use owned::*;
