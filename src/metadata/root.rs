//! The metadata root (II.24.2.1).
//!
//! The metadata of a module starts with the `BSJB` signature, a version string and a directory of
//! streams. [`Root::read`] validates the header and every stream's bounds; [`Root::stream`] returns
//! the bytes of a stream by name.

use crate::{file::parser::Parser, metadata::streams::StreamHeader, Result};

/// Magic signature of the metadata root ("BSJB")
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The parsed metadata root
#[derive(Clone, Debug)]
pub struct Root<'a> {
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Runtime version string, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved flags
    pub flags: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
    data: &'a [u8],
}

impl<'a> Root<'a> {
    /// Parse the metadata root at the start of `data`
    ///
    /// # Errors
    /// Returns an error if the signature does not match, the version string or stream directory is
    /// truncated, a stream lies outside `data`, or a stream name appears twice
    pub fn read(data: &'a [u8]) -> Result<Root<'a>> {
        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {:#x}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let _reserved = parser.read_le::<u32>()?;

        let version_length = parser.read_le::<u32>()? as usize;
        let version_bytes = parser.read_bytes(version_length)?;
        let version = version_bytes
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| char::from(*b))
            .collect::<String>();

        let flags = parser.read_le::<u16>()?;
        let stream_count = parser.read_le::<u16>()?;
        if stream_count == 0 || stream_count > 6 {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut stream_headers: Vec<StreamHeader> = Vec::with_capacity(usize::from(stream_count));
        for _ in 0..stream_count {
            let header = StreamHeader::read(&mut parser)?;

            match u32::checked_add(header.offset, header.size) {
                Some(end) if end as usize <= data.len() => {}
                Some(_) => {
                    return Err(malformed_error!(
                        "Stream {} at {:#x}+{:#x} lies outside the metadata ({} bytes)",
                        header.name,
                        header.offset,
                        header.size,
                        data.len()
                    ))
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        header.offset,
                        header.size
                    ))
                }
            }

            if stream_headers.iter().any(|known| known.name == header.name) {
                return Err(malformed_error!("Duplicate stream - {}", header.name));
            }

            stream_headers.push(header);
        }

        Ok(Root {
            major_version,
            minor_version,
            version,
            flags,
            stream_headers,
            data,
        })
    }

    /// The bytes of the stream called `name`, if present
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&'a [u8]> {
        self.stream_headers
            .iter()
            .find(|header| header.name == name)
            .map(|header| {
                let start = header.offset as usize;
                &self.data[start..start + header.size as usize]
            })
    }
}
