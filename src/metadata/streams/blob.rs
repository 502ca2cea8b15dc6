//! The `#Blob` heap.
//!
//! Binary values (signatures, marshaling descriptors, public keys) prefixed with their ECMA-335
//! compressed length (II.24.2.4). Offset 0 always holds the empty blob.

use crate::{file::parser::Parser, Result};

/// View over the `#Blob` heap
#[derive(Clone, Copy, Debug, Default)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a view over `data`
    ///
    /// # Errors
    /// Returns an error if the heap does not start with the empty blob
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the heap has no data, as for a module without a `#Blob` stream
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the blob starting at byte offset `index`, without its length prefix
    ///
    /// # Errors
    /// Returns an error if `index` or the encoded length run past the heap
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index == 0 {
            return Ok(&[]);
        }

        if index >= self.data.len() {
            return Err(malformed_error!(
                "#Blob index {} is outside of the heap ({} bytes)",
                index,
                self.data.len()
            ));
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }
}
