//! Normalization of an imported module into its canonical object graph.
//!
//! Normalization runs in the ordered [`NormalizationPhase`]s. For each phase a driver sets the phase
//! on the [`NormalizationContext`] and hands every raw object to [`allocate_normalized`] (creates
//! the counterpart) and [`execute_phase`] (completes a counterpart created earlier). Both check the
//! object's [`RawObjectKind`] against the phase and fail with [`crate::Error::InvalidPhase`] when it
//! does not belong there.
//!
//! Signatures and constructed types are interned: structurally equal values built anywhere in a
//! run resolve to one shared instance, so [`types::Interned::ptr_eq`] decides equality.
//!
//! Unresolved references are fatal, except in the phases listed by
//! [`crate::NormalizationOptions::tolerant_phases`]. There they are recorded on the context, the
//! dependent object is skipped, and [`NormalizationContext::flush_errors`] at the end of the phase
//! turns everything recorded into one [`crate::Error::SilentAbort`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilnorm::{
//!     metadata::{cilmodule::CilModule, diagnostics::WriterSink},
//!     normalize::normalize_module,
//!     ImportOptions, NormalizationOptions,
//! };
//!
//! let data = std::fs::read("module.metadata")?;
//! let module = CilModule::from_metadata("module", &data, &ImportOptions::default())?;
//! let graph = normalize_module(
//!     &module,
//!     NormalizationOptions::default(),
//!     &WriterSink::new(std::io::stderr()),
//! )?;
//! println!("{} normalized objects", graph.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod context;
mod dispatch;
/// The normalized object graph
pub mod objects;
mod phase;
mod raw;
mod signatures;
/// Interned canonical signatures
pub mod types;

pub use context::NormalizationContext;
pub use dispatch::{allocate_normalized, execute_phase};
pub use objects::{NormalizedGraph, NormalizedObject};
pub use phase::{NormalizationMode, NormalizationPhase};
pub use raw::{RawObject, RawObjectKind};

use strum::IntoEnumIterator;

use crate::{
    config::NormalizationOptions,
    metadata::{cilmodule::CilModule, diagnostics::DiagnosticSink},
    Result,
};

/// Run every phase over every object of `module`
///
/// Within a phase all allocations run before all phase steps, each in table order. Unresolved
/// references recorded during a phase are written to `sink` when that phase completes, and the run
/// stops there, before a later phase can trip over the objects that depend on them.
///
/// # Errors
/// Returns the first fatal error, or [`crate::Error::SilentAbort`] if unresolved references were
/// recorded or the run was cancelled
pub fn normalize_module(
    module: &CilModule,
    options: NormalizationOptions,
    sink: &dyn DiagnosticSink,
) -> Result<NormalizedGraph> {
    let _span = tracing::debug_span!("normalize_module", module = module.name()).entered();
    let mut context = NormalizationContext::new(module, options);

    for phase in NormalizationPhase::iter() {
        context.set_phase(phase);

        for kind in RawObjectKind::iter().filter(|kind| kind.allocates_in(phase)) {
            for object in RawObject::all_of(module, kind) {
                allocate_normalized(object, &context)?;
            }
        }

        for kind in RawObjectKind::iter().filter(|kind| kind.executes_in(phase)) {
            for object in RawObject::all_of(module, kind) {
                if let Some(normalized) = context.normalized(object.token()) {
                    execute_phase(object, &normalized, &context)?;
                }
            }
        }

        context.flush_errors(sink)?;
    }

    let graph = context.into_graph();
    tracing::debug!(
        module = module.name(),
        objects = graph.len(),
        "module normalized"
    );
    Ok(graph)
}
