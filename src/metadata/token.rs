//! Metadata tokens.
//!
//! A token identifies a single row of a single metadata table. The table id lives in the high byte
//! and the 1-based row index in the low 24 bits (ECMA-335 II.22). Tokens are the identity of every
//! imported object and the unit in which all cross-references are stored, so the object model never
//! holds Rust references between rows.
//!
//! Row 0 denotes the null reference for every table.
//!
//! # Examples
//!
//! ```rust
//! use cilnorm::metadata::{tables::TableId, token::Token};
//!
//! let token = Token::from_parts(TableId::Field, 3);
//! assert_eq!(token.value(), 0x0400_0003);
//! assert_eq!(token.table_id(), Some(TableId::Field));
//! assert_eq!(token.row(), 3);
//! assert!(!token.is_null());
//! ```

use std::fmt;

use crate::metadata::tables::TableId;

/// A metadata token: `table << 24 | row`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from a table id and a row index
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The raw table byte
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table this token points into, if the table byte names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_id(self.table())
    }

    /// The 1-based row index
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// True if this token refers to no row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
