//! Metadata import for CIL modules.
//!
//! # Key Components
//!
//! - [`cilmodule`] - The imported raw object graph of one module
//! - [`tables`] - Row content of every modeled table and the schema resolver
//! - [`signatures`] - Decoder for signature blobs
//! - [`marshalling`] - Decoder for native marshaling descriptors
//! - [`streams`] and [`root`] - The metadata root and its heaps
//! - [`token`] - Row references used throughout the metadata
//! - [`diagnostics`] - Collected import diagnostics and sinks

/// The imported raw metadata of one module
pub mod cilmodule;
/// Diagnostics collection and output sinks
pub mod diagnostics;
pub(crate) mod loader;
/// Native marshaling descriptors
pub mod marshalling;
/// The metadata root
pub mod root;
/// Signature blobs
pub mod signatures;
/// Heaps and the tables stream header
pub mod streams;
/// Metadata tables
pub mod tables;
/// Metadata tokens
pub mod token;
