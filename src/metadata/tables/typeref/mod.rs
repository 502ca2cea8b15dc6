//! The `TypeRef` table (II.22.38): types defined in other modules or assemblies.

mod loader;
mod owned;

pub use owned::*;
