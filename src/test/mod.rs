//! Shared helpers for unit tests.
//!
//! [`builder::MetadataBuilder`] assembles complete metadata roots in memory, so tests can import
//! exactly the rows they need instead of depending on binaries.
