//! The `#Strings` heap.
//!
//! A sequence of null-terminated UTF-8 strings addressed by byte offset. Offset 0 always holds the
//! empty string (II.24.2.3).

use std::{ffi::CStr, str};

use crate::Result;

/// View over the `#Strings` heap
#[derive(Clone, Copy, Debug, Default)]
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a view over `data`
    ///
    /// # Errors
    /// Returns an error if the heap does not start with the empty string
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the heap has no data, as for a module without a `#Strings` stream
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the string starting at byte offset `index`
    ///
    /// # Errors
    /// Returns an error if `index` is outside the heap, or the string is unterminated or not UTF-8
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index == 0 {
            return Ok("");
        }

        if index >= self.data.len() {
            return Err(malformed_error!(
                "#Strings index {} is outside of the heap ({} bytes)",
                index,
                self.data.len()
            ));
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => result
                .to_str()
                .map_err(|_| malformed_error!("Invalid string at index - {}", index)),
            Err(_) => Err(malformed_error!("Unterminated string at index - {}", index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const DATA: [u8; 33] = [
        0x00,
        0x3c, 0x4d, 0x61, 0x69, 0x6e, 0x3e, 0x24, 0x00,
        0x43, 0x5f, 0x53, 0x68, 0x61, 0x72, 0x70, 0x5f, 0x50, 0x4f, 0x43, 0x5f, 0x31, 0x00,
        0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00,
        0x41,
    ];

    #[test]
    fn crafted() {
        let str_view = Strings::from(&DATA).unwrap();

        assert_eq!(str_view.get(0).unwrap(), "");
        assert_eq!(str_view.get(1).unwrap(), "<Main>$");
        assert_eq!(str_view.get(9).unwrap(), "C_Sharp_POC_1");
        assert_eq!(str_view.get(23).unwrap(), "<Module>");
        // Offsets may point into the middle of a string
        assert_eq!(str_view.get(25).unwrap(), "odule>");
    }

    #[test]
    fn invalid() {
        assert!(Strings::from(&[0x41, 0x00]).is_err());
        assert!(Strings::from(&[]).is_err());

        let str_view = Strings::from(&DATA).unwrap();
        assert!(str_view.get(32).unwrap_err().is_malformed());
        assert!(str_view.get(100).is_err());
    }

    #[test]
    fn absent_heap() {
        let str_view = Strings::default();
        assert!(str_view.is_empty());
        assert_eq!(str_view.get(0).unwrap(), "");
        assert!(str_view.get(1).is_err());
    }
}
