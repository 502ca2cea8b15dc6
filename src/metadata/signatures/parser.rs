use crate::{
    file::parser::Parser,
    metadata::signatures::{
        ArrayDimensions, CallingConvention, CustomModifier, ParseFlags, Signature, SignatureArray,
        SignatureField, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
        SignatureParameter, SignatureProperty, SignatureTypeSpec, TypeSignature, ELEMENT_TYPE,
    },
    Error::RecursionLimit,
    Result,
};

/// Default maximum nesting depth of a single signature
pub const MAX_RECURSION_DEPTH: usize = 50;

/// Flags of a field type. `BYREF` appears in managed C++ and ref fields, `TYPEDBYREF` in old
/// framework assemblies.
const FIELD_FLAGS: ParseFlags = ParseFlags::PARAM;

/// Recursive-descent decoder for ECMA-335 signature blobs (II.23.2)
///
/// # Example
///
/// ```rust
/// use cilnorm::metadata::signatures::{ParseFlags, SignatureParser};
///
/// let data = &[0x20, 0x01, 0x01, 0x0E];
/// let mut parser = SignatureParser::new(data);
/// let sig = parser.parse(ParseFlags::MUST_BE_WHOLE_SIGNATURE)?.into_method()?;
/// assert_eq!(sig.params.len(), 1);
/// assert!(sig.has_this());
/// # Ok::<(), cilnorm::Error>(())
/// ```
///
/// A `SignatureParser` decodes exactly one signature; create a new one for every blob.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a new `SignatureParser` from a byte slice
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Replace the nesting limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode a signature that starts with a calling-convention byte and pick the variant from
    /// its low nibble: field, local variables, property, method spec, or otherwise a method.
    ///
    /// Only [`ParseFlags::MUST_BE_WHOLE_SIGNATURE`] is meaningful here; what each nested type may
    /// contain is decided by its position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for grammar violations or trailing bytes of a whole
    /// signature, [`crate::Error::OutOfBounds`] for truncated data, and
    /// [`crate::Error::RecursionLimit`] for too deeply nested types
    pub fn parse(&mut self, flags: ParseFlags) -> Result<Signature> {
        let convention = CallingConvention::from_bits_retain(self.parser.read_le::<u8>()?);

        let signature = match convention.kind() {
            kind if kind == CallingConvention::FIELD.bits() => Signature::Field(SignatureField {
                base: self.parse_type(FIELD_FLAGS)?,
            }),
            kind if kind == CallingConvention::LOCAL_SIG.bits() => {
                Signature::LocalVariables(self.parse_local_variables()?)
            }
            kind if kind == CallingConvention::PROPERTY.bits() => {
                Signature::Property(self.parse_property(convention)?)
            }
            kind if kind == CallingConvention::GENERIC_INST.bits() => {
                Signature::MethodSpec(self.parse_method_spec()?)
            }
            _ => Signature::Method(self.parse_method(convention)?),
        };

        self.finish(flags)?;
        Ok(signature)
    }

    /// Decode a `TypeSpec` blob (II.23.2.14). These carry no calling-convention byte; the first
    /// byte must be one of the type constructors `PTR`, `FNPTR`, `ARRAY`, `SZARRAY`,
    /// `GENERICINST`, `VAR` or `MVAR`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for any other leading element type and for grammar
    /// violations inside the type
    pub fn parse_type_spec(&mut self, flags: ParseFlags) -> Result<Signature> {
        let leading = self.parser.peek_byte()?;
        if !matches!(
            leading,
            ELEMENT_TYPE::PTR
                | ELEMENT_TYPE::FNPTR
                | ELEMENT_TYPE::ARRAY
                | ELEMENT_TYPE::SZARRAY
                | ELEMENT_TYPE::GENERICINST
                | ELEMENT_TYPE::VAR
                | ELEMENT_TYPE::MVAR
        ) {
            return Err(malformed_error!(
                "Invalid TypeSpec constructor - {:#04x}",
                leading
            ));
        }

        let base = self.parse_type(ParseFlags::empty())?;
        self.finish(flags)?;
        Ok(Signature::TypeSpec(SignatureTypeSpec { base }))
    }

    fn finish(&self, flags: ParseFlags) -> Result<()> {
        if flags.contains(ParseFlags::MUST_BE_WHOLE_SIGNATURE) && self.parser.has_more_data() {
            return Err(malformed_error!(
                "Only read {} of {} bytes of signature",
                self.parser.pos(),
                self.parser.len()
            ));
        }
        Ok(())
    }

    /// Upper bound for list pre-allocation; every element takes at least one byte
    fn capacity(&self, count: u32) -> usize {
        (count as usize).min(self.parser.remaining())
    }

    /// Parse a single type from the signature blob
    fn parse_type(&mut self, flags: ParseFlags) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let result = self.parse_type_inner(flags);
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self, flags: ParseFlags) -> Result<TypeSignature> {
        if flags.contains(ParseFlags::CUSTOM_MODIFIERS) {
            let modifiers = self.parse_custom_mods()?;
            if !modifiers.is_empty() {
                let inner = self.parse_type(flags)?;
                return Ok(TypeSignature::Modified(modifiers, Box::new(inner)));
            }
        }

        let offset = self.parser.pos();
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VOID => {
                if !flags.contains(ParseFlags::VOID) {
                    return Err(malformed_error!("Unexpected VOID at offset {}", offset));
                }
                Ok(TypeSignature::Void)
            }
            ELEMENT_TYPE::TYPEDBYREF => {
                if !flags.contains(ParseFlags::TYPED_BY_REF) {
                    return Err(malformed_error!("Unexpected TYPEDBYREF at offset {}", offset));
                }
                Ok(TypeSignature::TypedByRef)
            }
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSignature::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSignature::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSignature::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSignature::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSignature::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSignature::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSignature::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSignature::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSignature::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSignature::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSignature::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSignature::R8),
            ELEMENT_TYPE::I => Ok(TypeSignature::I),
            ELEMENT_TYPE::U => Ok(TypeSignature::U),
            ELEMENT_TYPE::STRING => Ok(TypeSignature::String),
            ELEMENT_TYPE::OBJECT => Ok(TypeSignature::Object),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSignature::ValueType(
                self.parser.read_compressed_token()?,
            )),
            ELEMENT_TYPE::CLASS => Ok(TypeSignature::Class(self.parser.read_compressed_token()?)),
            ELEMENT_TYPE::VAR => Ok(TypeSignature::GenericParamType(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeSignature::GenericParamMethod(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::SZARRAY => Ok(TypeSignature::SzArray(Box::new(
                self.parse_type(ParseFlags::CUSTOM_MODIFIERS)?,
            ))),
            ELEMENT_TYPE::ARRAY => self.parse_array(),
            ELEMENT_TYPE::FNPTR => {
                let convention = CallingConvention::from_bits_retain(self.parser.read_le::<u8>()?);
                if matches!(convention.kind(), 0x06..=0x08 | 0x0A) {
                    return Err(malformed_error!(
                        "FNPTR with non-method calling convention - {:#04x}",
                        convention.bits()
                    ));
                }
                Ok(TypeSignature::FnPtr(Box::new(self.parse_method(convention)?)))
            }
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not CLASS or VALUETYPE - {:#04x}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type(ParseFlags::empty())?;
                let arg_count = self.parser.read_compressed_uint()?;
                if arg_count == 0 {
                    return Err(malformed_error!("GENERICINST without type arguments"));
                }

                let mut type_args = Vec::with_capacity(self.capacity(arg_count));
                for _ in 0..arg_count {
                    type_args.push(self.parse_type(ParseFlags::empty())?);
                }

                Ok(TypeSignature::GenericInst(Box::new(base_type), type_args))
            }
            ELEMENT_TYPE::PTR => Ok(TypeSignature::Ptr(Box::new(
                self.parse_type(ParseFlags::CUSTOM_MODIFIERS | ParseFlags::VOID)?,
            ))),
            ELEMENT_TYPE::BYREF => {
                if !flags.contains(ParseFlags::BY_REF) {
                    return Err(malformed_error!("Unexpected BYREF at offset {}", offset));
                }
                Ok(TypeSignature::ByRef(Box::new(
                    self.parse_type(flags - ParseFlags::BY_REF)?,
                )))
            }
            ELEMENT_TYPE::PINNED => {
                if !flags.contains(ParseFlags::PINNED) {
                    return Err(malformed_error!("Unexpected PINNED at offset {}", offset));
                }

                // `fixed (void* p = ...)` is encoded as PINNED BYREF VOID
                let mut inner = flags - ParseFlags::PINNED;
                if inner.contains(ParseFlags::BY_REF) {
                    inner |= ParseFlags::VOID;
                }
                Ok(TypeSignature::Pinned(Box::new(self.parse_type(inner)?)))
            }
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => Err(malformed_error!(
                "Unexpected custom modifier {:#04x} at offset {}",
                current_byte,
                offset
            )),
            ELEMENT_TYPE::SENTINEL => Err(malformed_error!(
                "Unexpected SENTINEL at offset {}",
                offset
            )),
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {:#04x} at offset {}",
                current_byte,
                offset
            )),
        }
    }

    fn parse_array(&mut self) -> Result<TypeSignature> {
        let elem_type = self.parse_type(ParseFlags::empty())?;

        let rank = self.parser.read_compressed_uint()?;
        if rank == 0 {
            return Err(malformed_error!("ARRAY with rank 0"));
        }

        let num_sizes = self.parser.read_compressed_uint()?;
        if num_sizes > rank {
            return Err(malformed_error!(
                "ARRAY with {} sizes but rank {}",
                num_sizes,
                rank
            ));
        }

        let mut dimensions = vec![ArrayDimensions::default(); self.capacity(num_sizes)];
        for i in 0..num_sizes as usize {
            let size = self.parser.read_compressed_uint()?;
            match dimensions.get_mut(i) {
                Some(dimension) => dimension.size = Some(size),
                None => dimensions.push(ArrayDimensions {
                    size: Some(size),
                    lower_bound: None,
                }),
            }
        }

        let num_lo_bounds = self.parser.read_compressed_uint()?;
        if num_lo_bounds > rank {
            return Err(malformed_error!(
                "ARRAY with {} lower bounds but rank {}",
                num_lo_bounds,
                rank
            ));
        }

        for i in 0..num_lo_bounds as usize {
            let lower_bound = self.parser.read_compressed_int()?;
            match dimensions.get_mut(i) {
                Some(dimension) => dimension.lower_bound = Some(lower_bound),
                None => dimensions.push(ArrayDimensions {
                    size: None,
                    lower_bound: Some(lower_bound),
                }),
            }
        }

        Ok(TypeSignature::Array(SignatureArray {
            base: Box::new(elem_type),
            rank,
            dimensions,
        }))
    }

    /// Parse a `CMOD_OPT` / `CMOD_REQD` chain
    fn parse_custom_mods(&mut self) -> Result<Vec<CustomModifier>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let is_required = match self.parser.peek_byte()? {
                ELEMENT_TYPE::CMOD_REQD => true,
                ELEMENT_TYPE::CMOD_OPT => false,
                _ => break,
            };

            self.parser.advance_by(1)?;
            mods.push(CustomModifier {
                is_required,
                modifier_type: self.parser.read_compressed_token()?,
            });
        }

        Ok(mods)
    }

    fn parse_param(&mut self) -> Result<SignatureParameter> {
        Ok(SignatureParameter {
            base: self.parse_type(ParseFlags::PARAM)?,
        })
    }

    /// `MethodDefSig`, `MethodRefSig`, `StandAloneMethodSig` after the calling convention
    fn parse_method(&mut self, calling_convention: CallingConvention) -> Result<SignatureMethod> {
        let param_count_generic = if calling_convention.contains(CallingConvention::GENERIC) {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.parser.read_compressed_uint()?;
        let return_type = SignatureParameter {
            base: self.parse_type(ParseFlags::RETURN)?,
        };

        let mut params = Vec::with_capacity(self.capacity(param_count));
        let mut sentinel = None;
        for index in 0..param_count as usize {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                if !calling_convention.is_kind(CallingConvention::VARARG) {
                    return Err(malformed_error!(
                        "SENTINEL in a method signature with calling convention {:#04x}",
                        calling_convention.bits()
                    ));
                }
                if sentinel.is_some() {
                    return Err(malformed_error!("Second SENTINEL in a method signature"));
                }

                self.parser.advance_by(1)?;
                sentinel = Some(index);
            }

            params.push(self.parse_param()?);
        }

        Ok(SignatureMethod {
            calling_convention,
            param_count_generic,
            return_type,
            params,
            sentinel,
        })
    }

    fn parse_property(
        &mut self,
        calling_convention: CallingConvention,
    ) -> Result<SignatureProperty> {
        let param_count = self.parser.read_compressed_uint()?;
        let base = self.parse_type(ParseFlags::RETURN)?;

        let mut params = Vec::with_capacity(self.capacity(param_count));
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(SignatureProperty {
            has_this: calling_convention.contains(CallingConvention::HAS_THIS),
            base,
            params,
        })
    }

    fn parse_local_variables(&mut self) -> Result<SignatureLocalVariables> {
        let count = self.parser.read_compressed_uint()?;

        let mut locals = Vec::with_capacity(self.capacity(count));
        for _ in 0..count {
            locals.push(self.parse_type(ParseFlags::LOCAL)?);
        }

        Ok(SignatureLocalVariables { locals })
    }

    fn parse_method_spec(&mut self) -> Result<SignatureMethodSpec> {
        let arg_count = self.parser.read_compressed_uint()?;
        if arg_count == 0 {
            return Err(malformed_error!("MethodSpec without generic arguments"));
        }

        let mut generic_args = Vec::with_capacity(self.capacity(arg_count));
        for _ in 0..arg_count {
            generic_args.push(self.parse_type(ParseFlags::PARAM)?);
        }

        Ok(SignatureMethodSpec { generic_args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    fn parse(data: &[u8]) -> Result<Signature> {
        SignatureParser::new(data).parse(ParseFlags::MUST_BE_WHOLE_SIGNATURE)
    }

    fn field_type(data: &[u8]) -> TypeSignature {
        parse(data).unwrap().into_field().unwrap().base
    }

    #[test]
    fn primitive_types() {
        let cases = [
            (ELEMENT_TYPE::BOOLEAN, TypeSignature::Boolean),
            (ELEMENT_TYPE::CHAR, TypeSignature::Char),
            (ELEMENT_TYPE::I1, TypeSignature::I1),
            (ELEMENT_TYPE::U1, TypeSignature::U1),
            (ELEMENT_TYPE::I2, TypeSignature::I2),
            (ELEMENT_TYPE::U2, TypeSignature::U2),
            (ELEMENT_TYPE::I4, TypeSignature::I4),
            (ELEMENT_TYPE::U4, TypeSignature::U4),
            (ELEMENT_TYPE::I8, TypeSignature::I8),
            (ELEMENT_TYPE::U8, TypeSignature::U8),
            (ELEMENT_TYPE::R4, TypeSignature::R4),
            (ELEMENT_TYPE::R8, TypeSignature::R8),
            (ELEMENT_TYPE::I, TypeSignature::I),
            (ELEMENT_TYPE::U, TypeSignature::U),
            (ELEMENT_TYPE::STRING, TypeSignature::String),
            (ELEMENT_TYPE::OBJECT, TypeSignature::Object),
        ];

        for (byte, expected) in cases {
            assert_eq!(field_type(&[0x06, byte]), expected);
        }
    }

    #[test]
    fn class_and_valuetype() {
        assert_eq!(
            field_type(&[0x06, 0x12, 0x49]),
            TypeSignature::Class(Token::new(0x0100_0012))
        );
        assert_eq!(
            field_type(&[0x06, 0x11, 0x08]),
            TypeSignature::ValueType(Token::new(0x0200_0002))
        );
    }

    #[test]
    fn arrays() {
        assert_eq!(
            field_type(&[0x06, 0x1D, 0x08]),
            TypeSignature::SzArray(Box::new(TypeSignature::I4))
        );

        // int32[0...3, 2...]
        let array = field_type(&[0x06, 0x14, 0x08, 0x02, 0x01, 0x04, 0x02, 0x00, 0x04]);
        let TypeSignature::Array(array) = array else {
            panic!("not an array: {array:?}");
        };
        assert_eq!(*array.base, TypeSignature::I4);
        assert_eq!(array.rank, 2);
        assert_eq!(
            array.dimensions,
            vec![
                ArrayDimensions {
                    size: Some(4),
                    lower_bound: Some(0)
                },
                ArrayDimensions {
                    size: None,
                    lower_bound: Some(2)
                },
            ]
        );
    }

    #[test]
    fn invalid_array_shapes() {
        // rank 0
        assert!(parse(&[0x06, 0x14, 0x08, 0x00, 0x00, 0x00]).unwrap_err().is_malformed());
        // 2 sizes for rank 1
        assert!(parse(&[0x06, 0x14, 0x08, 0x01, 0x02, 0x01, 0x01, 0x00])
            .unwrap_err()
            .is_malformed());
        // 2 lower bounds for rank 1
        assert!(parse(&[0x06, 0x14, 0x08, 0x01, 0x00, 0x02, 0x00, 0x00])
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn pointers_and_byrefs() {
        assert_eq!(
            field_type(&[0x06, 0x0F, 0x01]),
            TypeSignature::Ptr(Box::new(TypeSignature::Void))
        );
        assert_eq!(
            field_type(&[0x06, 0x10, 0x08]),
            TypeSignature::ByRef(Box::new(TypeSignature::I4))
        );

        // VOID is only valid behind a pointer or as a return type
        assert!(parse(&[0x06, 0x01]).is_err());
        // BYREF BYREF
        assert!(parse(&[0x06, 0x10, 0x10, 0x08]).is_err());
    }

    #[test]
    fn generic_instance() {
        // List<int32, string>
        let sig = field_type(&[0x06, 0x15, 0x12, 0x49, 0x02, 0x08, 0x0E]);
        assert_eq!(
            sig,
            TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0012))),
                vec![TypeSignature::I4, TypeSignature::String]
            )
        );

        // base must be CLASS or VALUETYPE
        assert!(parse(&[0x06, 0x15, 0x08, 0x01, 0x08]).is_err());
        // no arguments
        assert!(parse(&[0x06, 0x15, 0x12, 0x49, 0x00]).is_err());
    }

    #[test]
    fn custom_modifiers() {
        // modreq(TypeRef 1) modopt(TypeRef 2) int32
        let sig = field_type(&[0x06, 0x1F, 0x05, 0x20, 0x09, 0x08]);
        assert_eq!(
            sig.modifiers(),
            &[
                CustomModifier {
                    is_required: true,
                    modifier_type: Token::new(0x0100_0001)
                },
                CustomModifier {
                    is_required: false,
                    modifier_type: Token::new(0x0100_0002)
                },
            ]
        );
        assert_eq!(*sig.unmodified(), TypeSignature::I4);

        // modifiers are not allowed inside generic arguments
        assert!(parse(&[0x06, 0x15, 0x12, 0x49, 0x01, 0x1F, 0x05, 0x08]).is_err());
    }

    #[test]
    fn methods() {
        // instance string M(int32, ref object)
        let method = parse(&[0x20, 0x02, 0x0E, 0x08, 0x10, 0x1C])
            .unwrap()
            .into_method()
            .unwrap();
        assert!(method.has_this());
        assert!(!method.explicit_this());
        assert_eq!(method.return_type.base, TypeSignature::String);
        assert_eq!(method.params.len(), 2);
        assert!(method.params[1].base.is_by_ref());
        assert_eq!(method.sentinel, None);

        // static void M<T, U>(!!0)
        let method = parse(&[0x10, 0x02, 0x01, 0x01, 0x1E, 0x00])
            .unwrap()
            .into_method()
            .unwrap();
        assert_eq!(method.param_count_generic, 2);
        assert_eq!(method.params[0].base, TypeSignature::GenericParamMethod(0));
    }

    #[test]
    fn vararg_sentinel() {
        // vararg void M(int32, ..., string, object)
        let method = parse(&[0x05, 0x03, 0x01, 0x08, 0x41, 0x0E, 0x1C])
            .unwrap()
            .into_method()
            .unwrap();
        assert!(method.is_vararg());
        assert_eq!(method.sentinel, Some(1));
        assert_eq!(method.fixed_params().len(), 1);
        assert_eq!(method.varargs().len(), 2);

        // sentinel in a default calling convention
        assert!(parse(&[0x00, 0x02, 0x01, 0x08, 0x41, 0x0E]).is_err());
        // two sentinels
        assert!(parse(&[0x05, 0x03, 0x01, 0x41, 0x08, 0x41, 0x0E, 0x1C]).is_err());
    }

    #[test]
    fn properties_and_locals() {
        let property = parse(&[0x28, 0x01, 0x0E, 0x08]).unwrap().into_property().unwrap();
        assert!(property.has_this);
        assert_eq!(property.base, TypeSignature::String);
        assert_eq!(property.params.len(), 1);

        // int32, pinned ref uint8, typedref
        let locals = parse(&[0x07, 0x03, 0x08, 0x45, 0x10, 0x05, 0x16])
            .unwrap()
            .into_local_variables()
            .unwrap();
        assert_eq!(locals.locals.len(), 3);
        assert!(locals.locals[1].is_pinned());
        assert_eq!(locals.locals[2], TypeSignature::TypedByRef);

        // PINNED outside a local
        assert!(parse(&[0x06, 0x45, 0x08]).is_err());
    }

    #[test]
    fn method_spec() {
        let spec = parse(&[0x0A, 0x02, 0x08, 0x0E]).unwrap().into_method_spec().unwrap();
        assert_eq!(spec.generic_args, vec![TypeSignature::I4, TypeSignature::String]);
        assert!(parse(&[0x0A, 0x00]).is_err());
    }

    #[test]
    fn function_pointer() {
        // FNPTR default int32()
        let sig = field_type(&[0x06, 0x1B, 0x00, 0x00, 0x08]);
        let TypeSignature::FnPtr(method) = sig else {
            panic!("not a function pointer");
        };
        assert_eq!(method.return_type.base, TypeSignature::I4);

        // FNPTR with a field calling convention
        assert!(parse(&[0x06, 0x1B, 0x06, 0x08]).is_err());
    }

    #[test]
    fn type_spec_constructors() {
        for data in [
            &[0x0F, 0x08][..],
            &[0x1D, 0x08],
            &[0x13, 0x00],
            &[0x1E, 0x01],
            &[0x15, 0x12, 0x49, 0x01, 0x08],
            &[0x14, 0x08, 0x01, 0x00, 0x00],
            &[0x1B, 0x00, 0x00, 0x01],
        ] {
            let sig = SignatureParser::new(data)
                .parse_type_spec(ParseFlags::MUST_BE_WHOLE_SIGNATURE)
                .unwrap();
            assert!(sig.into_type_spec().is_ok(), "{data:?}");
        }

        for data in [&[0x08][..], &[0x12, 0x49], &[0x11, 0x08], &[0x10, 0x08]] {
            let error = SignatureParser::new(data)
                .parse_type_spec(ParseFlags::MUST_BE_WHOLE_SIGNATURE)
                .unwrap_err();
            assert!(error.is_malformed(), "{data:?}");
        }
    }

    #[test]
    fn whole_signature() {
        assert!(parse(&[0x06, 0x08, 0x00]).is_err());

        let sig = SignatureParser::new(&[0x06, 0x08, 0x00])
            .parse(ParseFlags::empty())
            .unwrap();
        assert_eq!(sig.into_field().unwrap().base, TypeSignature::I4);
    }

    #[test]
    fn recursion_limit() {
        let mut data = vec![0x06];
        data.extend(std::iter::repeat(0x1D).take(20));
        data.push(0x08);

        assert!(SignatureParser::new(&data)
            .parse(ParseFlags::MUST_BE_WHOLE_SIGNATURE)
            .is_ok());
        assert_eq!(
            SignatureParser::new(&data)
                .with_max_depth(10)
                .parse(ParseFlags::MUST_BE_WHOLE_SIGNATURE)
                .unwrap_err(),
            RecursionLimit(10)
        );
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            parse(&[0x20, 0x02, 0x01, 0x08]),
            Err(crate::Error::OutOfBounds { .. })
        ));
        assert!(parse(&[]).is_err());
    }
}
