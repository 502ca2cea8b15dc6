//! The `#GUID` heap.
//!
//! A packed array of 16-byte GUIDs addressed by 1-based index (II.24.2.5). Index 0 is the null GUID.

use crate::Result;

/// View over the `#GUID` heap
#[derive(Clone, Copy, Debug, Default)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a view over `data`
    ///
    /// # Errors
    /// Returns an error if the heap is not a whole number of GUIDs
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// Number of GUIDs in the heap
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / 16
    }

    /// True if the heap holds no GUID
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the GUID at 1-based `index`; index 0 is the null GUID and yields `None`
    ///
    /// # Errors
    /// Returns an error if `index` is past the last GUID
    pub fn get(&self, index: usize) -> Result<Option<uguid::Guid>> {
        if index == 0 {
            return Ok(None);
        }

        if index > self.len() {
            return Err(malformed_error!(
                "#GUID index {} is outside of the heap ({} entries)",
                index,
                self.len()
            ));
        }

        let offset_start = (index - 1) * 16;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[offset_start..offset_start + 16]);

        Ok(Some(uguid::Guid::from_bytes(buffer)))
    }
}
