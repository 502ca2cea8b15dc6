//! Field and parameter marshaling descriptors (ECMA-335 II.23.4).
//!
//! A `FieldMarshal` row attaches a blob to a field or parameter that describes how the value is
//! converted when it crosses into unmanaged code. The blob starts with a compressed native-type
//! kind, optionally followed by kind specific data:
//!
//! | Kind | Data |
//! |------|------|
//! | simple kinds (`I4`, `LPSTR`, `BSTR`, ...) | none, the blob must end |
//! | `SAFEARRAY` | optional variant element type |
//! | `FIXEDSYSSTRING` | element count |
//! | `FIXEDARRAY` | element count |
//! | `CUSTOMMARSHALER` | four length-prefixed strings |
//! | `ARRAY` | element kind, optional size parameter index, optional element count |
//!
//! # Examples
//!
//! ```rust
//! use cilnorm::metadata::marshalling::{parse_marshalling_descriptor, MarshalSpec, NATIVE_TYPE};
//!
//! let spec = parse_marshalling_descriptor(&[NATIVE_TYPE::FIXEDARRAY, 0x10])?;
//! assert_eq!(spec, MarshalSpec::FixedArray { size: 16 });
//! # Ok::<(), cilnorm::Error>(())
//! ```

use crate::{file::parser::Parser, Result};

#[allow(non_snake_case)]
/// Native type constants as defined in ECMA-335 II.23.4
pub mod NATIVE_TYPE {
    /// 4-byte `BOOL`
    pub const BOOLEAN: u8 = 0x02;
    /// Signed 8-bit integer
    pub const I1: u8 = 0x03;
    /// Unsigned 8-bit integer
    pub const U1: u8 = 0x04;
    /// Signed 16-bit integer
    pub const I2: u8 = 0x05;
    /// Unsigned 16-bit integer
    pub const U2: u8 = 0x06;
    /// Signed 32-bit integer
    pub const I4: u8 = 0x07;
    /// Unsigned 32-bit integer
    pub const U4: u8 = 0x08;
    /// Signed 64-bit integer
    pub const I8: u8 = 0x09;
    /// Unsigned 64-bit integer
    pub const U8: u8 = 0x0a;
    /// 32-bit float
    pub const R4: u8 = 0x0b;
    /// 64-bit float
    pub const R8: u8 = 0x0c;
    /// COM `CURRENCY`
    pub const CURRENCY: u8 = 0x0f;
    /// COM `BSTR` string
    pub const BSTR: u8 = 0x13;
    /// Pointer to a null-terminated ANSI string
    pub const LPSTR: u8 = 0x14;
    /// Pointer to a null-terminated UTF-16 string
    pub const LPWSTR: u8 = 0x15;
    /// Pointer to a platform-dependent string
    pub const LPTSTR: u8 = 0x16;
    /// Inline string of fixed size, followed by the size
    pub const FIXEDSYSSTRING: u8 = 0x17;
    /// COM `IUnknown` pointer
    pub const IUNKNOWN: u8 = 0x19;
    /// COM `IDispatch` pointer
    pub const IDISPATCH: u8 = 0x1a;
    /// Structure marshaled by value
    pub const STRUCT: u8 = 0x1b;
    /// COM interface pointer
    pub const INTERFACE: u8 = 0x1c;
    /// COM `SAFEARRAY`, optionally followed by the variant type and a user-defined type name
    pub const SAFEARRAY: u8 = 0x1d;
    /// Inline array of fixed size, followed by the size and optionally the element type
    pub const FIXEDARRAY: u8 = 0x1e;
    /// Platform-sized signed integer
    pub const INT: u8 = 0x1f;
    /// Platform-sized unsigned integer
    pub const UINT: u8 = 0x20;
    /// String passed by value in a fixed buffer
    pub const BYVALSTR: u8 = 0x22;
    /// ANSI `BSTR`
    pub const ANSIBSTR: u8 = 0x23;
    /// Platform-dependent `BSTR`
    pub const TBSTR: u8 = 0x24;
    /// 2-byte `VARIANT_BOOL`
    pub const VARIANTBOOL: u8 = 0x25;
    /// Function pointer
    pub const FUNC: u8 = 0x26;
    /// Type decided at run time
    pub const ASANY: u8 = 0x28;
    /// C-style array: element type, size parameter, element count and flags
    pub const ARRAY: u8 = 0x2a;
    /// Pointer to a structure
    pub const LPSTRUCT: u8 = 0x2b;
    /// Custom marshaler: GUID, native type name, marshaler type and cookie
    pub const CUSTOMMARSHALER: u8 = 0x2c;
    /// `HRESULT`
    pub const ERROR: u8 = 0x2d;
    /// No element type given for an array
    pub const MAX: u8 = 0x50;
}

/// A decoded marshaling descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarshalSpec {
    /// A kind without parameters; holds the `NATIVE_TYPE` value
    Native(u32),
    /// `SAFEARRAY` with an optional variant element type
    SafeArray {
        /// `VARTYPE` of the elements, `None` if the blob ends after the kind
        element_type: Option<u32>,
    },
    /// `FIXEDSYSSTRING`, a string embedded in the structure
    FixedString {
        /// Number of characters
        size: u32,
    },
    /// `FIXEDARRAY`, an array embedded in the structure
    FixedArray {
        /// Number of elements
        size: u32,
    },
    /// `CUSTOMMARSHALER`
    CustomMarshaler {
        /// GUID of the marshaler, usually empty
        guid: String,
        /// Unmanaged type name
        unmanaged_type: String,
        /// Managed type name of the marshaler
        managed_type: String,
        /// Cookie passed to the marshaler
        cookie: String,
    },
    /// `ARRAY`, a native array whose size may come from a parameter
    Array {
        /// `NATIVE_TYPE` of the elements
        element_type: u32,
        /// Index of the parameter holding the element count
        param_index: Option<u32>,
        /// Additional element count
        extras: Option<u32>,
    },
}

/// Decode a whole marshaling descriptor
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for unknown kinds or trailing data, and
/// [`crate::Error::OutOfBounds`] for truncated data
pub fn parse_marshalling_descriptor(data: &[u8]) -> Result<MarshalSpec> {
    MarshallingParser::new(data).parse_descriptor()
}

/// Decoder for a single marshaling blob
pub struct MarshallingParser<'a> {
    parser: Parser<'a>,
}

impl<'a> MarshallingParser<'a> {
    /// Create a parser over `data`
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        MarshallingParser {
            parser: Parser::new(data),
        }
    }

    /// Decode the descriptor
    ///
    /// # Errors
    /// See [`parse_marshalling_descriptor`]
    pub fn parse_descriptor(&mut self) -> Result<MarshalSpec> {
        let kind = self.parser.read_compressed_uint()?;

        let spec = match u8::try_from(kind).unwrap_or(u8::MAX) {
            NATIVE_TYPE::BOOLEAN
            | NATIVE_TYPE::I1
            | NATIVE_TYPE::U1
            | NATIVE_TYPE::I2
            | NATIVE_TYPE::U2
            | NATIVE_TYPE::I4
            | NATIVE_TYPE::U4
            | NATIVE_TYPE::I8
            | NATIVE_TYPE::U8
            | NATIVE_TYPE::R4
            | NATIVE_TYPE::R8
            | NATIVE_TYPE::CURRENCY
            | NATIVE_TYPE::BSTR
            | NATIVE_TYPE::LPSTR
            | NATIVE_TYPE::LPWSTR
            | NATIVE_TYPE::LPTSTR
            | NATIVE_TYPE::IUNKNOWN
            | NATIVE_TYPE::IDISPATCH
            | NATIVE_TYPE::STRUCT
            | NATIVE_TYPE::INTERFACE
            | NATIVE_TYPE::INT
            | NATIVE_TYPE::UINT
            | NATIVE_TYPE::BYVALSTR
            | NATIVE_TYPE::ANSIBSTR
            | NATIVE_TYPE::TBSTR
            | NATIVE_TYPE::VARIANTBOOL
            | NATIVE_TYPE::FUNC
            | NATIVE_TYPE::ASANY
            | NATIVE_TYPE::LPSTRUCT
            | NATIVE_TYPE::ERROR
            | NATIVE_TYPE::MAX => {
                self.expect_end()?;
                MarshalSpec::Native(kind)
            }
            // Trailing data after the optional element type is tolerated
            NATIVE_TYPE::SAFEARRAY => MarshalSpec::SafeArray {
                element_type: self.read_optional()?,
            },
            NATIVE_TYPE::FIXEDSYSSTRING => {
                let size = self.parser.read_compressed_uint()?;
                self.expect_end()?;
                MarshalSpec::FixedString { size }
            }
            NATIVE_TYPE::FIXEDARRAY => {
                let size = self.parser.read_compressed_uint()?;
                self.expect_end()?;
                MarshalSpec::FixedArray { size }
            }
            NATIVE_TYPE::CUSTOMMARSHALER => {
                let guid = self.parser.read_compressed_string_utf8()?;
                let unmanaged_type = self.parser.read_compressed_string_utf8()?;
                let managed_type = self.parser.read_compressed_string_utf8()?;
                let cookie = self.parser.read_compressed_string_utf8()?;
                self.expect_end()?;
                MarshalSpec::CustomMarshaler {
                    guid,
                    unmanaged_type,
                    managed_type,
                    cookie,
                }
            }
            NATIVE_TYPE::ARRAY => {
                let element_type = self.parser.read_compressed_uint()?;
                let param_index = self.read_optional()?;
                let extras = self.read_optional()?;
                MarshalSpec::Array {
                    element_type,
                    param_index,
                    extras,
                }
            }
            _ => {
                return Err(malformed_error!(
                    "Unknown marshal spec kind - {:#x}",
                    kind
                ))
            }
        };

        Ok(spec)
    }

    fn read_optional(&mut self) -> Result<Option<u32>> {
        if self.parser.has_more_data() {
            Ok(Some(self.parser.read_compressed_uint()?))
        } else {
            Ok(None)
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.parser.has_more_data() {
            return Err(malformed_error!(
                "Only read {} of {} bytes of marshal spec",
                self.parser.pos(),
                self.parser.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_kinds() {
        for kind in [
            NATIVE_TYPE::BOOLEAN,
            NATIVE_TYPE::I4,
            NATIVE_TYPE::LPWSTR,
            NATIVE_TYPE::IUNKNOWN,
            NATIVE_TYPE::VARIANTBOOL,
            NATIVE_TYPE::MAX,
        ] {
            assert_eq!(
                parse_marshalling_descriptor(&[kind]).unwrap(),
                MarshalSpec::Native(u32::from(kind))
            );
        }

        assert!(parse_marshalling_descriptor(&[NATIVE_TYPE::I4, 0x00])
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn safe_array() {
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::SAFEARRAY]).unwrap(),
            MarshalSpec::SafeArray { element_type: None }
        );
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::SAFEARRAY, 0x08, 0x00]).unwrap(),
            MarshalSpec::SafeArray {
                element_type: Some(8)
            }
        );
    }

    #[test]
    fn fixed_kinds() {
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::FIXEDSYSSTRING, 0x80, 0x80]).unwrap(),
            MarshalSpec::FixedString { size: 0x80 }
        );
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::FIXEDARRAY, 0x04]).unwrap(),
            MarshalSpec::FixedArray { size: 4 }
        );
        assert!(parse_marshalling_descriptor(&[NATIVE_TYPE::FIXEDARRAY]).is_err());
        assert!(parse_marshalling_descriptor(&[NATIVE_TYPE::FIXEDARRAY, 0x04, 0x01]).is_err());
    }

    #[test]
    fn custom_marshaler() {
        let mut data = vec![NATIVE_TYPE::CUSTOMMARSHALER, 0x00, 0x00];
        data.push(0x07);
        data.extend_from_slice(b"My.Type");
        data.push(0x02);
        data.extend_from_slice(b"ck");

        assert_eq!(
            parse_marshalling_descriptor(&data).unwrap(),
            MarshalSpec::CustomMarshaler {
                guid: String::new(),
                unmanaged_type: String::new(),
                managed_type: "My.Type".to_string(),
                cookie: "ck".to_string(),
            }
        );

        data.push(0x00);
        assert!(parse_marshalling_descriptor(&data).is_err());
    }

    #[test]
    fn array() {
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::ARRAY, NATIVE_TYPE::I4]).unwrap(),
            MarshalSpec::Array {
                element_type: u32::from(NATIVE_TYPE::I4),
                param_index: None,
                extras: None,
            }
        );
        assert_eq!(
            parse_marshalling_descriptor(&[NATIVE_TYPE::ARRAY, NATIVE_TYPE::U1, 0x02, 0x10])
                .unwrap(),
            MarshalSpec::Array {
                element_type: u32::from(NATIVE_TYPE::U1),
                param_index: Some(2),
                extras: Some(16),
            }
        );
        assert!(parse_marshalling_descriptor(&[NATIVE_TYPE::ARRAY]).is_err());
    }

    #[test]
    fn unknown_kind() {
        for kind in [0x00, 0x01, 0x0d, 0x21, 0x2e, 0x51] {
            assert!(parse_marshalling_descriptor(&[kind]).unwrap_err().is_malformed(), "{kind:#x}");
        }
        assert!(parse_marshalling_descriptor(&[]).is_err());
    }
}
