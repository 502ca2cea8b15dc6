use strum::{Display, EnumCount, EnumIter};

/// The ordered steps of a normalization run
///
/// Variants are declared in the order a driver runs them. Every phase-gated operation checks the
/// phase the [`crate::normalize::NormalizationContext`] is in before touching an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumCount)]
pub enum NormalizationPhase {
    /// Every type definition gets its normalized shell
    CreationOfTypeDefinitions,
    /// Type references and type specifications are bound to definitions or external types
    ResolutionOfTypeReferences,
    /// Base types and enclosing types are linked
    CreationOfTypeHierarchy,
    /// Class layouts are attached
    CompletionOfTypeNormalization,
    /// Fields are created under their owning types
    CreationOfFieldDefinitions,
    /// Methods are created under their owning types
    CreationOfMethodDefinitions,
    /// Member references, method instantiations, stand-alone signatures, properties and parameter
    /// names are completed
    CompletionOfMethodNormalization,
}

/// How a lookup of a normalized counterpart may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NormalizationMode {
    /// Return an existing counterpart, never create one
    LookupExisting,
    /// Create the counterpart; finding one already present means a cycle
    Allocate,
    /// Return the existing counterpart or create it
    Default,
}

impl NormalizationMode {
    /// True if an existing counterpart may be returned
    #[must_use]
    pub fn allows_lookup(self) -> bool {
        matches!(self, NormalizationMode::LookupExisting | NormalizationMode::Default)
    }

    /// True if a missing counterpart may be created
    #[must_use]
    pub fn allows_allocate(self) -> bool {
        matches!(self, NormalizationMode::Allocate | NormalizationMode::Default)
    }
}
