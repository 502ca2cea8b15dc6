//! The `ModuleRef` table (II.22.31): names of other modules of the same assembly.

mod loader;
mod owned;

pub use owned::*;
