// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # cilnorm
//!
//! Importer and normalizer for ECMA-335 (CIL) binary metadata.
//!
//! `cilnorm` works on the metadata of a single module, starting at its `BSJB` root. Importing
//! decodes the compressed `#~` tables stream and its heaps into a table-indexed object model whose
//! rows can refer to any row of any table, including rows that come later. Normalizing then walks
//! that model in a fixed sequence of phases and builds a canonical graph in which equal signatures
//! and constructed types are shared instances.
//!
//! ## Layers
//!
//! - [`Parser`] - bounds-checked little-endian byte cursor with the compressed integer encodings
//! - [`metadata::tables`] - the table schema resolver and the object model of the modeled tables
//! - [`metadata::signatures`] - the signature grammar
//! - [`metadata::marshalling`] - native marshaling descriptors
//! - [`metadata::cilmodule`] - the importer
//! - [`normalize`] - the phase-driven normalization engine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cilnorm::{
//!     metadata::{cilmodule::CilModule, diagnostics::WriterSink},
//!     normalize::normalize_module,
//!     ImportOptions, NormalizationOptions,
//! };
//!
//! let data = std::fs::read("Library.metadata")?;
//! let module = CilModule::from_metadata("Library", &data, &ImportOptions::default())?;
//!
//! for diagnostic in module.diagnostics().iter() {
//!     println!("{diagnostic}");
//! }
//!
//! let graph = normalize_module(
//!     &module,
//!     NormalizationOptions::default(),
//!     &WriterSink::new(std::io::stderr()),
//! )?;
//! for (id, ty) in graph.types() {
//!     println!("{id}: {}", ty.full_name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`]. Damaged input is reported as
//! [`Error::Malformed`] or [`Error::OutOfBounds`], references that cannot be followed as
//! [`Error::UnresolvedReference`]. [`Error::SilentAbort`] means the problems were already written to a
//! [`metadata::diagnostics::DiagnosticSink`] and the run stopped without producing a result.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Import and normalization options
pub mod config;

/// ECMA-335 metadata: root, heaps, tables, signatures and the importer
///
/// # Examples
///
/// ```rust,no_run
/// use cilnorm::{metadata::{cilmodule::CilModule, tables::TypeDef}, ImportOptions};
///
/// let data = std::fs::read("Library.metadata")?;
/// let module = CilModule::from_metadata("Library", &data, &ImportOptions::default())?;
/// for type_def in module.table::<TypeDef>() {
///     println!("{} {}", type_def.token(), type_def.content()?.full_name());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod metadata;

pub mod normalize;

/// `cilnorm` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilnorm` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use cilnorm::{metadata::cilmodule::CilModule, Error, ImportOptions};
///
/// let data = std::fs::read("Library.metadata")?;
/// match CilModule::from_metadata("Library", &data, &ImportOptions::default()) {
///     Ok(module) => println!("{} rows in TypeDef", module.tables().type_def.len()),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {message}"),
///     Err(error) => println!("Error: {error}"),
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub use error::Error;

pub use config::{CancellationFlag, ImportOptions, NormalizationOptions};

/// Heaps of the metadata root
pub use metadata::streams::{Blob, Guid, StreamHeader, Strings, TablesHeader};

/// The byte cursor every decoder is built on
pub use file::parser::Parser;
