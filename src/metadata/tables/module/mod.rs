//! The `Module` table (II.22.30).
//!
//! Exactly one row describing the module itself.

mod loader;
mod owned;

pub use owned::*;
