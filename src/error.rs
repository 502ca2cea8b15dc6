use thiserror::Error;

use crate::{
    metadata::token::Token,
    normalize::{NormalizationPhase, RawObjectKind},
};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! unresolved_error {
    ($target:expr, $referrer:expr, $msg:expr) => {
        crate::Error::UnresolvedReference {
            target: $target,
            referrer: $referrer,
            message: $msg.to_string(),
        }
    };

    ($target:expr, $referrer:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::UnresolvedReference {
            target: $target,
            referrer: $referrer,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can return.
///
/// The variants map onto four kinds of failure:
///
/// ## Malformed input
/// - [`Error::Malformed`] - The byte stream violates the table, heap or signature grammar
/// - [`Error::OutOfBounds`] - A read would have run past the end of a buffer
/// - [`Error::RecursionLimit`] - A signature nests deeper than the configured limit
///
/// ## Unresolved references
/// - [`Error::UnresolvedReference`] - A token refers to a row that cannot be materialized; the
///   referring object is carried along for diagnostics
///
/// ## Driver defects
/// - [`Error::InvalidPhase`] - A phase-gated normalization operation was called in the wrong phase
///
/// ## Cooperative cancellation
/// - [`Error::SilentAbort`] - Stop processing without reporting a user-visible failure
///
/// # Examples
///
/// ```rust
/// use cilnorm::{Error, metadata::cilmodule::CilModule, ImportOptions};
///
/// match CilModule::from_metadata("broken", &[0u8; 4], &ImportOptions::default()) {
///     Ok(_) => unreachable!(),
///     Err(error) if error.is_malformed() => {}
///     Err(error) => panic!("unexpected error: {error}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// Includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Recursion limit reached while decoding nested signatures.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A token or row index refers to an object that this import cannot materialize.
    ///
    /// `target` is the token that could not be resolved, `referrer` the token of the object whose
    /// column, signature or normalization step needed it.
    #[error("Unresolved reference to {target} from {referrer}: {message}")]
    UnresolvedReference {
        /// The token that could not be resolved
        target: Token,
        /// The object that holds the reference
        referrer: Token,
        /// Human readable detail
        message: String,
    },

    /// A phase-gated normalization operation was invoked outside of its phases.
    #[error("{kind} cannot be normalized during phase {phase}")]
    InvalidPhase {
        /// The phase the context was in
        phase: NormalizationPhase,
        /// The kind of raw object the operation was invoked on
        kind: RawObjectKind,
    },

    /// Cooperative stop signal. Not a failure of the input or of the caller.
    #[error("Aborted: {0}")]
    SilentAbort(String),
}

impl Error {
    /// Returns true for the malformed-format kinds (`Malformed`, `OutOfBounds`, `RecursionLimit`)
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::Malformed { .. } | Error::OutOfBounds { .. } | Error::RecursionLimit(_)
        )
    }

    /// Returns true if this error is an unresolved reference
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::UnresolvedReference { .. })
    }

    /// Returns true if this error is the cooperative silent-abort signal
    #[must_use]
    pub fn is_silent_abort(&self) -> bool {
        matches!(self, Error::SilentAbort(_))
    }
}
