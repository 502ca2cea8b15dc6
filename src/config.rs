//! Import and normalization configuration
//!
//! Both option sets are plain values with public fields, a `Default` that matches the usual
//! compiler front-end behavior, a few presets and `with_*` setters for chained construction.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    metadata::signatures::MAX_RECURSION_DEPTH, normalize::NormalizationPhase, Error, Result,
};

/// Cooperative cancellation signal shared between a driver and running imports
///
/// Importers and the normalizer check the flag between rows and objects and stop with
/// [`Error::SilentAbort`] once it is raised.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that is not raised
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag; every clone observes it
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once [`CancellationFlag::cancel`] was called on any clone
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with the silent-abort signal if the flag is raised
    ///
    /// # Errors
    /// Returns [`Error::SilentAbort`] once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::SilentAbort("Cancelled".to_string()));
        }
        Ok(())
    }
}

/// Options of a single module import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Deepest type nesting accepted inside one signature
    pub max_signature_depth: usize,
    /// Treat rows of tables without an object model as malformed instead of skipping them
    pub strict_tables: bool,
    /// Compute owner back-links of fields, methods and parameters from the list columns
    pub ownership_links: bool,
    /// Checked between rows
    pub cancellation: Option<CancellationFlag>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_signature_depth: MAX_RECURSION_DEPTH,
            strict_tables: false,
            ownership_links: true,
            cancellation: None,
        }
    }
}

impl ImportOptions {
    /// Reject every table without an object model
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_tables: true,
            ..Self::default()
        }
    }

    /// Skip unmodeled tables and ownership links
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            ownership_links: false,
            ..Self::default()
        }
    }

    /// Replace the signature nesting limit
    #[must_use]
    pub fn with_max_signature_depth(mut self, depth: usize) -> Self {
        self.max_signature_depth = depth;
        self
    }

    /// Choose whether unmodeled tables are malformed
    #[must_use]
    pub fn with_strict_tables(mut self, strict: bool) -> Self {
        self.strict_tables = strict;
        self
    }

    /// Choose whether owner back-links are computed
    #[must_use]
    pub fn with_ownership_links(mut self, enabled: bool) -> Self {
        self.ownership_links = enabled;
        self
    }

    /// Attach a cancellation flag
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Fail with the silent-abort signal if the attached flag is raised
    ///
    /// # Errors
    /// Returns [`Error::SilentAbort`] once cancelled
    pub fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }
}

/// Options of a normalization run
#[derive(Debug, Clone)]
pub struct NormalizationOptions {
    /// Phases in which an unresolved reference is recorded instead of propagated
    pub tolerant_phases: Vec<NormalizationPhase>,
    /// Checked between objects
    pub cancellation: Option<CancellationFlag>,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            tolerant_phases: vec![
                NormalizationPhase::ResolutionOfTypeReferences,
                NormalizationPhase::CompletionOfMethodNormalization,
            ],
            cancellation: None,
        }
    }
}

impl NormalizationOptions {
    /// Every unresolved reference propagates
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tolerant_phases: Vec::new(),
            cancellation: None,
        }
    }

    /// Replace the set of tolerant phases
    #[must_use]
    pub fn with_tolerant_phases(mut self, phases: &[NormalizationPhase]) -> Self {
        self.tolerant_phases = phases.to_vec();
        self
    }

    /// Attach a cancellation flag
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// True if unresolved references are recorded during `phase`
    #[must_use]
    pub fn is_tolerant(&self, phase: NormalizationPhase) -> bool {
        self.tolerant_phases.contains(&phase)
    }
}
