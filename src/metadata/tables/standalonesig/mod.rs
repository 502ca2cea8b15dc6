//! The `StandAloneSig` table (II.22.36): local variable lists and call-site signatures.

mod loader;
mod owned;

pub use owned::*;
