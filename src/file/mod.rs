//! Low-level byte access.
//!
//! The importer never touches the file system: every decoder in this crate works on an immutable
//! in-memory slice supplied by the caller. This module provides the two building blocks all of them
//! share:
//!
//! - [`io`] - little-endian scalar reads at an explicit offset ([`io::read_le_at`]) and the 2/4-byte
//!   index read whose width is decided by the table schema ([`io::read_le_at_dyn`])
//! - [`parser::Parser`] - the forward-only byte cursor used by the heaps, the tables stream, the
//!   signature grammar and the marshaling decoder

pub mod io;
pub mod parser;
