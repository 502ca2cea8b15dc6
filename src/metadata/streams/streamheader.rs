//! Entries of the metadata root's stream directory (II.24.2.2).

use crate::{file::parser::Parser, Result};

/// Names of the streams the importer recognizes
pub const STREAM_NAMES: [&str; 6] = ["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"];

/// Location and name of one metadata stream, relative to the metadata root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset from the start of the metadata root
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Name, e.g. `#~`
    pub name: String,
}

impl StreamHeader {
    /// Read one header at the cursor and advance past its 4-byte aligned name
    ///
    /// # Errors
    /// Returns an error if the data ends early, the name is unterminated or longer than 32 bytes, or
    /// the name is not one of [`STREAM_NAMES`]
    pub fn read(parser: &mut Parser<'_>) -> Result<StreamHeader> {
        let offset = parser.read_le::<u32>()?;
        let size = parser.read_le::<u32>()?;

        let mut name = String::with_capacity(32);
        let mut terminated = false;
        let mut consumed = 0_usize;
        while consumed < 32 {
            let name_char = parser.read_le::<u8>()?;
            consumed += 1;
            if name_char == 0 {
                terminated = true;
                break;
            }
            name.push(char::from(name_char));
        }

        if !terminated {
            return Err(malformed_error!("Stream header name is not terminated"));
        }

        // Names are padded to the next 4 byte boundary
        let padding = (4 - consumed % 4) % 4;
        parser.advance_by(padding)?;

        if !STREAM_NAMES.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader { offset, size, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
            0xFF,
        ];

        let mut parser = Parser::new(&header_bytes);
        let parsed_header = StreamHeader::read(&mut parser).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
        assert_eq!(parser.pos(), 12);
    }

    #[test]
    fn padded_name() {
        let mut bytes = vec![0x10, 0, 0, 0, 0x20, 0, 0, 0];
        bytes.extend_from_slice(b"#Strings\0\0\0\0");
        let mut parser = Parser::new(&bytes);
        let parsed_header = StreamHeader::read(&mut parser).unwrap();
        assert_eq!(parsed_header.name, "#Strings");
        assert_eq!(parser.pos(), 20);
    }

    #[test]
    fn crafted_invalid() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00, 0x00,
        ];

        let mut parser = Parser::new(&header_bytes);
        assert!(StreamHeader::read(&mut parser).is_err());
    }
}
