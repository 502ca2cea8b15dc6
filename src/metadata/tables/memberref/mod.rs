//! The `MemberRef` table (II.22.25): references to fields and methods of other types.

mod loader;
mod owned;

pub use owned::*;
