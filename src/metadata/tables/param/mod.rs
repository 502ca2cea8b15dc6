//! The `Param` table (II.22.33).
//!
//! Sequence 0 describes the return value, 1 and up the parameters in declaration order.

mod loader;
mod owned;

pub use owned::*;
