//! Signature parsing for CIL metadata.
//!
//! Signatures are blob-heap values that encode the type of a field, the shape of a method, the
//! locals of a method body, a property, a generic method instantiation or a constructed type. All
//! of them share the recursive type production of ECMA-335 II.23.2.12.
//!
//! # Signature Kinds
//!
//! - **Method Signatures** - `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig`
//! - **Field Signatures** - Field type information and modifiers
//! - **Property Signatures** - Property type and indexer parameters
//! - **LocalVar Signatures** - Local variable types within method bodies
//! - **MethodSpec Signatures** - Generic method instantiation arguments
//! - **TypeSpec Signatures** - Constructed types referenced from the `TypeSpec` table
//!
//! Every blob except a type spec starts with a calling-convention byte whose low nibble selects the
//! kind; [`parse_signature`] decodes any of them into a [`Signature`], which is then narrowed with
//! `into_field`, `into_method`, ... Type-spec blobs start directly with an element type whose values
//! collide with calling conventions, so they have their own entry, [`parse_type_spec_signature`],
//! chosen by the column the blob came from.
//!
//! # Examples
//!
//! ```rust
//! use cilnorm::metadata::signatures::{
//!     parse_local_var_signature, parse_method_signature, TypeSignature,
//! };
//!
//! let method_sig = parse_method_signature(&[0x20, 0x01, 0x01, 0x0E])?;
//! assert_eq!(method_sig.params[0].base, TypeSignature::String);
//!
//! // 2 locals: int32, string
//! let locals_sig = parse_local_var_signature(&[0x07, 0x02, 0x08, 0x0E])?;
//! assert_eq!(locals_sig.locals.len(), 2);
//! # Ok::<(), cilnorm::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod parser;
mod types;

pub use parser::*;
pub use types::*;

use crate::Result;

/// Decode a signature blob of any kind except a type spec
///
/// # Errors
/// Returns an error if the blob is malformed, see [`SignatureParser::parse`]
pub fn parse_signature(data: &[u8], flags: ParseFlags) -> Result<Signature> {
    SignatureParser::new(data).parse(flags)
}

/// Decode a `TypeSpec` blob
///
/// # Errors
/// Returns an error if the blob is malformed, see [`SignatureParser::parse_type_spec`]
pub fn parse_type_spec_signature(data: &[u8], flags: ParseFlags) -> Result<Signature> {
    SignatureParser::new(data).parse_type_spec(flags)
}

/// Parse a whole `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`
///
/// # Errors
/// Returns an error if the data is malformed or holds another kind of signature
pub fn parse_method_signature(data: &[u8]) -> Result<SignatureMethod> {
    parse_signature(data, ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_method()
}

/// Parse a whole `FieldSig`
///
/// # Errors
/// Returns an error if the data is malformed or holds another kind of signature
pub fn parse_field_signature(data: &[u8]) -> Result<SignatureField> {
    parse_signature(data, ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_field()
}

/// Parse a whole `PropertySig`
///
/// # Errors
/// Returns an error if the data is malformed or holds another kind of signature
pub fn parse_property_signature(data: &[u8]) -> Result<SignatureProperty> {
    parse_signature(data, ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_property()
}

/// Parse a whole `LocalVarSig`
///
/// # Errors
/// Returns an error if the data is malformed or holds another kind of signature
pub fn parse_local_var_signature(data: &[u8]) -> Result<SignatureLocalVariables> {
    parse_signature(data, ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_local_variables()
}

/// Parse a whole `MethodSpec` instantiation blob
///
/// # Errors
/// Returns an error if the data is malformed or holds another kind of signature
pub fn parse_method_spec_signature(data: &[u8]) -> Result<SignatureMethodSpec> {
    parse_signature(data, ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_method_spec()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    /// One blob per kind, paired with its expected kind
    fn samples() -> Vec<(SignatureKind, Signature)> {
        let whole = ParseFlags::MUST_BE_WHOLE_SIGNATURE;
        vec![
            (SignatureKind::Field, parse_signature(&[0x06, 0x08], whole).unwrap()),
            (
                SignatureKind::LocalVariables,
                parse_signature(&[0x07, 0x01, 0x0E], whole).unwrap(),
            ),
            (
                SignatureKind::Property,
                parse_signature(&[0x08, 0x00, 0x08], whole).unwrap(),
            ),
            (
                SignatureKind::MethodSpec,
                parse_signature(&[0x0A, 0x01, 0x08], whole).unwrap(),
            ),
            (
                SignatureKind::TypeSpec,
                parse_type_spec_signature(&[0x1D, 0x08], whole).unwrap(),
            ),
            (
                SignatureKind::Method,
                parse_signature(&[0x00, 0x00, 0x01], whole).unwrap(),
            ),
        ]
    }

    fn narrow(signature: Signature, kind: SignatureKind) -> Result<()> {
        match kind {
            SignatureKind::Field => signature.into_field().map(|_| ()),
            SignatureKind::LocalVariables => signature.into_local_variables().map(|_| ()),
            SignatureKind::Property => signature.into_property().map(|_| ()),
            SignatureKind::MethodSpec => signature.into_method_spec().map(|_| ()),
            SignatureKind::TypeSpec => signature.into_type_spec().map(|_| ()),
            SignatureKind::Method => signature.into_method().map(|_| ()),
        }
    }

    #[test]
    fn narrowing_matrix() {
        for (actual, signature) in samples() {
            assert_eq!(signature.kind(), actual);
            for expected in SignatureKind::iter() {
                let result = narrow(signature.clone(), expected);
                if expected == actual {
                    assert!(result.is_ok(), "{actual} as {expected}");
                } else {
                    let error = result.unwrap_err();
                    assert!(error.is_malformed(), "{actual} as {expected}");
                    assert!(error.to_string().contains(&expected.to_string()));
                    assert!(error.to_string().contains(&actual.to_string()));
                }
            }
        }
    }

    #[test]
    fn one_trailing_byte() {
        let data = [0x06, 0x08, 0xFF];
        assert!(parse_field_signature(&data).unwrap_err().is_malformed());
        assert!(parse_signature(&data, ParseFlags::empty()).is_ok());

        let data = [0x1D, 0x08, 0x00];
        assert!(parse_type_spec_signature(&data, ParseFlags::MUST_BE_WHOLE_SIGNATURE).is_err());
        assert!(parse_type_spec_signature(&data, ParseFlags::empty()).is_ok());
    }

    #[test]
    fn typed_entries() {
        assert_eq!(parse_field_signature(&[0x06, 0x0E]).unwrap().base, TypeSignature::String);
        assert!(parse_method_signature(&[0x06, 0x0E]).is_err());
        assert_eq!(parse_property_signature(&[0x28, 0x00, 0x08]).unwrap().params.len(), 0);
        assert_eq!(parse_local_var_signature(&[0x07, 0x00]).unwrap().locals.len(), 0);
        assert_eq!(parse_method_spec_signature(&[0x0A, 0x01, 0x0E]).unwrap().generic_args.len(), 1);
    }
}
