//! Metadata streams.
//!
//! The metadata root lists up to five streams. The importer reads:
//!
//! - `#~` - the compressed tables stream, see [`TablesHeader`]
//! - `#Strings` - identifier strings, see [`Strings`]
//! - `#Blob` - signatures and other binary values, see [`Blob`]
//! - `#GUID` - module identifiers, see [`Guid`]
//!
//! `#US` (user strings) is only referenced from method bodies and is not read. The uncompressed
//! `#-` tables stream is recognized and rejected.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;

pub use blob::Blob;
pub use guid::Guid;
pub use streamheader::{StreamHeader, STREAM_NAMES};
pub use strings::Strings;
pub use tablesheader::{TablesHeader, SUPPORTED_VERSIONS};
