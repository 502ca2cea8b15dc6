//! Diagnostics collection for metadata import and normalization.
//!
//! Not every irregularity in a metadata image aborts an import: tables this crate does not model
//! are skipped, and references that cannot be resolved during a tolerant normalization phase are
//! recorded and reported together at the end. Those events are collected here.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe, append-only container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSink`] - Line-oriented output sink the normalizer flushes unresolved references to
//! - [`WriterSink`] - [`DiagnosticSink`] over any [`std::io::Write`]
//!
//! Every entry pushed to a [`Diagnostics`] is also emitted as a `tracing` event at the matching
//! level, so a subscriber installed by the host sees the same stream. This crate never installs a
//! subscriber itself.
//!
//! # Usage Examples
//!
//! ```rust
//! use cilnorm::metadata::diagnostics::{DiagnosticCategory, DiagnosticSink, Diagnostics};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.info(DiagnosticCategory::Table, "Skipping 3 rows of table CustomAttribute");
//! diagnostics.write_line(format_args!("Unresolved reference to {}", "System.Object"));
//!
//! assert_eq!(diagnostics.count(), 2);
//! assert!(diagnostics.has_errors());
//! ```

use std::{
    fmt::{self, Write as _},
    io::{self, Write as _},
    sync::{Mutex, PoisonError},
};

use crate::metadata::token::Token;

/// Severity level of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational, the import is complete
    Info,
    /// Something was skipped or tolerated
    Warning,
    /// Something could not be imported or resolved
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// The component that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Heap streams and the metadata root
    Heap,
    /// Table layout and rows
    Table,
    /// Signature blobs
    Signature,
    /// Field marshal blobs
    Marshalling,
    /// Type definitions and references
    Type,
    /// Method definitions and references
    Method,
    /// Field definitions
    Field,
    /// Normalization phases
    Normalization,
    /// Everything else, including lines written through [`DiagnosticSink`]
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Heap => write!(f, "Heap"),
            DiagnosticCategory::Table => write!(f, "Table"),
            DiagnosticCategory::Signature => write!(f, "Signature"),
            DiagnosticCategory::Marshalling => write!(f, "Marshalling"),
            DiagnosticCategory::Type => write!(f, "Type"),
            DiagnosticCategory::Method => write!(f, "Method"),
            DiagnosticCategory::Field => write!(f, "Field"),
            DiagnosticCategory::Normalization => write!(f, "Normalization"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Producing component
    pub category: DiagnosticCategory,
    /// Human readable message
    pub message: String,
    /// Byte offset inside the metadata, if known
    pub offset: Option<u64>,
    /// Object the diagnostic is about, if any
    pub token: Option<Token>,
}

impl Diagnostic {
    /// Create a new diagnostic without context
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            offset: None,
            token: None,
        }
    }

    /// Attach a byte offset
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach the token of the object concerned
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(offset) = self.offset {
            write!(f, " (offset: 0x{offset:08x})")?;
        }

        if let Some(token) = self.token {
            write!(f, " (token: {token})")?;
        }

        Ok(())
    }
}

/// Line-oriented output collaborator of the normalizer
pub trait DiagnosticSink: Send + Sync {
    /// Write one line of text
    fn write_line(&self, line: fmt::Arguments<'_>);

    /// Make everything written so far visible
    fn flush(&self);
}

/// Thread-safe, append-only collection of diagnostics
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Record an informational entry
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Record a warning
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Record an error
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Record `diagnostic` and emit it as a `tracing` event
    pub fn push(&self, diagnostic: Diagnostic) {
        let token = diagnostic.token.map(|token| token.value());
        match diagnostic.severity {
            DiagnosticSeverity::Info => tracing::info!(
                category = %diagnostic.category,
                token,
                "{}",
                diagnostic.message
            ),
            DiagnosticSeverity::Warning => tracing::warn!(
                category = %diagnostic.category,
                token,
                "{}",
                diagnostic.message
            ),
            DiagnosticSeverity::Error => tracing::error!(
                category = %diagnostic.category,
                token,
                "{}",
                diagnostic.message
            ),
        }

        self.entries.push(diagnostic);
    }

    /// True if anything was recorded
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// True if an error was recorded
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Number of entries
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Number of entries with `severity`
    pub fn count_of(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// All errors
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .map(|(_, d)| d)
            .collect()
    }

    /// All entries of `category`
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.category == category)
            .map(|(_, d)| d)
            .collect()
    }

    /// Multi-line summary: counts, then every error
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.count_of(DiagnosticSeverity::Error);
        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            error_count,
            self.count_of(DiagnosticSeverity::Warning),
            self.count_of(DiagnosticSeverity::Info)
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl DiagnosticSink for Diagnostics {
    fn write_line(&self, line: fmt::Arguments<'_>) {
        self.error(DiagnosticCategory::General, line.to_string());
    }

    fn flush(&self) {}
}

/// [`DiagnosticSink`] writing one line per call to an [`io::Write`]
#[derive(Debug)]
pub struct WriterSink<W: io::Write + Send> {
    writer: Mutex<W>,
}

impl<W: io::Write + Send> WriterSink<W> {
    /// Wrap `writer`
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    /// Return the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: io::Write + Send> DiagnosticSink for WriterSink<W> {
    fn write_line(&self, line: fmt::Arguments<'_>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = writeln!(writer, "{line}") {
            tracing::warn!(%error, "Failed to write diagnostic line");
        }
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = writer.flush() {
            tracing::warn!(%error, "Failed to flush diagnostics");
        }
    }
}
