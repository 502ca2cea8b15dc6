//! Forward-only byte cursor.
//!
//! [`Parser`] is the sequential reader shared by every decoder in this crate. It reads fixed-width
//! little-endian scalars, the ECMA-335 compressed integer forms used inside blobs, and table or heap
//! indices whose width is decided by the table schema. Every read either advances the position or
//! fails; no method moves the position backward. Forking a read position is done by cloning the
//! cursor.
//!
//! # Examples
//!
//! ```rust
//! use cilnorm::Parser;
//!
//! let mut parser = Parser::new(&[0x06, 0x08, 0x81, 0x00]);
//! assert_eq!(parser.peek_byte()?, 0x06);
//! assert_eq!(parser.read_le::<u8>()?, 0x06);
//! assert_eq!(parser.read_compressed_uint()?, 8);
//! assert_eq!(parser.read_compressed_uint()?, 0x100);
//! assert!(!parser.has_more_data());
//! # Ok::<(), cilnorm::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, read_le_at_dyn, CilIO},
    metadata::token::Token,
    Result,
};

/// A sequential reader over an immutable byte slice
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new cursor positioned at the start of `data`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying slice
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying slice is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True while unread bytes remain
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of unread bytes
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Current read position
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The complete underlying slice
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Skip `step` bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.read_bytes(step).map(|_| ())
    }

    /// Inspect the next byte without consuming it
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| out_of_bounds_error!())
    }

    /// Read a little-endian scalar
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the scalar does not fit into the remaining bytes
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a table or heap index that is 2 bytes wide, or 4 bytes if `is_large`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index does not fit into the remaining bytes
    pub fn read_index(&mut self, is_large: bool) -> Result<u32> {
        read_le_at_dyn(self.data, &mut self.position, is_large)
    }

    /// Borrow the next `length` bytes and advance past them
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or_else(|| out_of_bounds_error!())?;
        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read an ECMA-335 compressed unsigned integer (II.23.2)
    ///
    /// # Errors
    /// Returns an error if the leading byte is not a valid 1, 2 or 4 byte form, or if the data ends
    /// early
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            return Ok(((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            return Ok(((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3);
        }

        Err(malformed_error!(
            "Invalid compressed uint - {:#04x} at offset {}",
            first_byte,
            self.position - 1
        ))
    }

    /// Read an ECMA-335 compressed signed integer (II.23.2, rotated sign bit)
    ///
    /// # Errors
    /// Returns an error if the underlying compressed unsigned integer is invalid
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let start = self.position;
        let unsigned = self.read_compressed_uint()?;
        let bias = match self.position - start {
            1 => 0x40,
            2 => 0x2000,
            _ => 0x1000_0000,
        };

        // The value fits into 29 bits, the shift leaves 28
        #[allow(clippy::cast_possible_wrap)]
        let magnitude = (unsigned >> 1) as i32;
        if unsigned & 1 == 0 {
            Ok(magnitude)
        } else {
            Ok(magnitude - bias)
        }
    }

    /// Read a compressed `TypeDefOrRef` token as used inside signatures (II.23.2.8)
    ///
    /// # Errors
    /// Returns an error if the tag bits select no table
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - {:#x}",
                    compressed_token
                ))
            }
        };

        Ok(Token::new(table | (compressed_token >> 2)))
    }

    /// Read a UTF-8 string prefixed with its compressed length
    ///
    /// # Errors
    /// Returns an error if the length runs past the data or the bytes are not UTF-8
    pub fn read_compressed_string_utf8(&mut self) -> Result<String> {
        let length = self.read_compressed_uint()? as usize;
        let start = self.position;
        let bytes = self.read_bytes(length)?;

        String::from_utf8(bytes.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 compressed string at offset {}-{}: {}",
                start,
                self.position,
                e.utf8_error()
            )
        })
    }
}
