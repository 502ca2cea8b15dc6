//! The `AssemblyRef` table (II.22.5): assemblies this module depends on.

mod loader;
mod owned;

pub use owned::*;
