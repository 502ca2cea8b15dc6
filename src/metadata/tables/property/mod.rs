//! The `Property` table (II.22.34).

mod loader;
mod owned;

pub use owned::*;
