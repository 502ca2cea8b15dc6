//! Conversion of decoded signatures into canonical, interned ones.
//!
//! Type tokens inside a signature are resolved to their normalized types on the way: definitions
//! must already exist, references and type specifications are normalized on first use.

use crate::{
    metadata::{
        signatures::{
            CallingConvention, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
            SignatureProperty, TypeSignature,
        },
        tables::TableId,
        token::Token,
    },
    normalize::{
        objects::NormalizedObject,
        types::{
            InstantiationSig, Interned, LocalsSig, MethodSig, NormalizedModifier, PrimitiveType,
            PropertySig, TypeSig,
        },
        NormalizationContext, NormalizationMode,
    },
    Result,
};

impl NormalizationContext<'_> {
    /// The canonical type a `TypeDef`, `TypeRef` or `TypeSpec` token denotes
    ///
    /// Named types become [`TypeSig::ValueType`] if `value_type` is set, [`TypeSig::Class`]
    /// otherwise; a `TypeSpec` yields its constructed type.
    ///
    /// # Errors
    /// Returns an unresolved-reference error if the target cannot be normalized, and a
    /// malformed-format error if `token` does not name a type
    pub fn type_reference(
        &self,
        token: Token,
        value_type: bool,
        referrer: Token,
    ) -> Result<Interned<TypeSig>> {
        let mode = match token.table_id() {
            Some(TableId::TypeDef) => NormalizationMode::LookupExisting,
            Some(TableId::TypeRef | TableId::TypeSpec) => NormalizationMode::Default,
            _ => {
                return Err(malformed_error!(
                    "{} referenced from {} is not a type",
                    token,
                    referrer
                ))
            }
        };

        match self.get_normalized(token, mode, referrer)? {
            NormalizedObject::Type(id) if value_type => {
                Ok(self.make_unique_type(TypeSig::ValueType(id)))
            }
            NormalizedObject::Type(id) => Ok(self.make_unique_type(TypeSig::Class(id))),
            NormalizedObject::Constructed(constructed) => Ok(constructed),
            other => Err(malformed_error!(
                "{} referenced from {} normalized to a {}",
                token,
                referrer,
                other.describe()
            )),
        }
    }

    /// The canonical form of `signature`
    ///
    /// # Errors
    /// Returns an error if a type token inside `signature` cannot be resolved
    pub fn normalize_type(
        &self,
        signature: &TypeSignature,
        referrer: Token,
    ) -> Result<Interned<TypeSig>> {
        if let Some(primitive) = PrimitiveType::from_signature(signature) {
            return Ok(self.make_unique_type(TypeSig::Primitive(primitive)));
        }

        let draft = match signature {
            TypeSignature::Class(token) => return self.type_reference(*token, false, referrer),
            TypeSignature::ValueType(token) => return self.type_reference(*token, true, referrer),
            TypeSignature::GenericParamType(number) => TypeSig::GenericParam(*number),
            TypeSignature::GenericParamMethod(number) => TypeSig::MethodGenericParam(*number),
            TypeSignature::Ptr(inner) => TypeSig::Pointer(self.normalize_type(inner, referrer)?),
            TypeSignature::ByRef(inner) => TypeSig::ByRef(self.normalize_type(inner, referrer)?),
            TypeSignature::Pinned(inner) => TypeSig::Pinned(self.normalize_type(inner, referrer)?),
            TypeSignature::SzArray(inner) => {
                TypeSig::SzArray(self.normalize_type(inner, referrer)?)
            }
            TypeSignature::Array(array) => TypeSig::Array {
                element: self.normalize_type(&array.base, referrer)?,
                rank: array.rank,
                dimensions: array.dimensions.clone(),
            },
            TypeSignature::FnPtr(method) => {
                TypeSig::FunctionPointer(self.normalize_method_signature(method, referrer)?)
            }
            TypeSignature::GenericInst(base, args) => TypeSig::GenericInstance {
                base: self.normalize_type(base, referrer)?,
                args: self.normalize_types(args, referrer)?,
            },
            TypeSignature::Modified(modifiers, inner) => {
                let modifiers = modifiers
                    .iter()
                    .map(|modifier| {
                        Ok(NormalizedModifier {
                            is_required: modifier.is_required,
                            modifier: self.type_reference(modifier.modifier_type, false, referrer)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                TypeSig::Modified {
                    modifiers,
                    inner: self.normalize_type(inner, referrer)?,
                }
            }
            primitive => {
                return Err(malformed_error!(
                    "Unexpected element type {:?} in signature of {}",
                    primitive,
                    referrer
                ))
            }
        };

        Ok(self.make_unique_type(draft))
    }

    fn normalize_types(
        &self,
        signatures: &[TypeSignature],
        referrer: Token,
    ) -> Result<Vec<Interned<TypeSig>>> {
        signatures
            .iter()
            .map(|signature| self.normalize_type(signature, referrer))
            .collect()
    }

    /// The canonical form of a method signature
    ///
    /// # Errors
    /// Returns an error if a type token inside `signature` cannot be resolved
    pub fn normalize_method_signature(
        &self,
        signature: &SignatureMethod,
        referrer: Token,
    ) -> Result<Interned<MethodSig>> {
        let draft = MethodSig {
            calling_convention: signature.calling_convention,
            generic_param_count: signature.param_count_generic,
            return_type: self.normalize_type(&signature.return_type.base, referrer)?,
            params: signature
                .params
                .iter()
                .map(|param| self.normalize_type(&param.base, referrer))
                .collect::<Result<_>>()?,
            sentinel: signature.sentinel,
        };

        Ok(self.make_unique_method(draft))
    }

    /// The canonical form of a generic method instantiation
    ///
    /// The instantiation carries the default calling convention, whatever the blob encoded.
    ///
    /// # Errors
    /// Returns an error if a type token inside `signature` cannot be resolved
    pub fn normalize_method_spec_signature(
        &self,
        signature: &SignatureMethodSpec,
        referrer: Token,
    ) -> Result<Interned<InstantiationSig>> {
        let draft = InstantiationSig {
            calling_convention: CallingConvention::DEFAULT,
            args: self.normalize_types(&signature.generic_args, referrer)?,
        };

        Ok(self.make_unique_instantiation(draft))
    }

    /// The canonical form of a local-variable list
    ///
    /// # Errors
    /// Returns an error if a type token inside `signature` cannot be resolved
    pub fn normalize_locals_signature(
        &self,
        signature: &SignatureLocalVariables,
        referrer: Token,
    ) -> Result<Interned<LocalsSig>> {
        let draft = LocalsSig {
            locals: self.normalize_types(&signature.locals, referrer)?,
        };

        Ok(self.make_unique_locals(draft))
    }

    /// The canonical form of a property signature
    ///
    /// # Errors
    /// Returns an error if a type token inside `signature` cannot be resolved
    pub fn normalize_property_signature(
        &self,
        signature: &SignatureProperty,
        referrer: Token,
    ) -> Result<Interned<PropertySig>> {
        let draft = PropertySig {
            has_this: signature.has_this,
            property_type: self.normalize_type(&signature.base, referrer)?,
            params: signature
                .params
                .iter()
                .map(|param| self.normalize_type(&param.base, referrer))
                .collect::<Result<_>>()?,
        };

        Ok(self.make_unique_property(draft))
    }
}
