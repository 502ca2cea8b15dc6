use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::{metadata::token::Token, Result};

#[allow(non_snake_case)]
/// Element type constants of ECMA-335 II.23.1.16
pub mod ELEMENT_TYPE {
    /// `void`, only valid as a return type
    pub const VOID: u8 = 0x01;
    /// `System.Boolean`
    pub const BOOLEAN: u8 = 0x02;
    /// `System.Char`
    pub const CHAR: u8 = 0x03;
    /// `System.SByte`
    pub const I1: u8 = 0x04;
    /// `System.Byte`
    pub const U1: u8 = 0x05;
    /// `System.Int16`
    pub const I2: u8 = 0x06;
    /// `System.UInt16`
    pub const U2: u8 = 0x07;
    /// `System.Int32`
    pub const I4: u8 = 0x08;
    /// `System.UInt32`
    pub const U4: u8 = 0x09;
    /// `System.Int64`
    pub const I8: u8 = 0x0a;
    /// `System.UInt64`
    pub const U8: u8 = 0x0b;
    /// `System.Single`
    pub const R4: u8 = 0x0c;
    /// `System.Double`
    pub const R8: u8 = 0x0d;
    /// `System.String`
    pub const STRING: u8 = 0x0e;
    /// Unmanaged pointer, followed by the pointee type
    pub const PTR: u8 = 0x0f;
    /// Managed reference, followed by the referenced type
    pub const BYREF: u8 = 0x10;
    /// Value type, followed by a `TypeDefOrRef` token
    pub const VALUETYPE: u8 = 0x11;
    /// Reference type, followed by a `TypeDefOrRef` token
    pub const CLASS: u8 = 0x12;
    /// Generic parameter of a type, followed by its number
    pub const VAR: u8 = 0x13;
    /// General array: element type, rank, sizes and lower bounds
    pub const ARRAY: u8 = 0x14;
    /// Generic instantiation: generic type, argument count and arguments
    pub const GENERICINST: u8 = 0x15;
    /// `System.TypedReference`
    pub const TYPEDBYREF: u8 = 0x16;
    /// `System.IntPtr`
    pub const I: u8 = 0x18;
    /// `System.UIntPtr`
    pub const U: u8 = 0x19;
    /// Function pointer, followed by a full method signature
    pub const FNPTR: u8 = 0x1b;
    /// `System.Object`
    pub const OBJECT: u8 = 0x1c;
    /// Single-dimensional array with lower bound 0
    pub const SZARRAY: u8 = 0x1d;
    /// Generic parameter of a method, followed by its number
    pub const MVAR: u8 = 0x1e;
    /// Required modifier, followed by a `TypeDefOrRef` token
    pub const CMOD_REQD: u8 = 0x1f;
    /// Optional modifier, followed by a `TypeDefOrRef` token
    pub const CMOD_OPT: u8 = 0x20;
    /// Start of the variable arguments of a vararg call site
    pub const SENTINEL: u8 = 0x41;
    /// Local variable whose target is pinned
    pub const PINNED: u8 = 0x45;
}

bitflags! {
    /// The calling-convention byte that starts every non-type-spec signature (II.23.2.3).
    ///
    /// The low nibble is a kind, not a set of bits: use [`CallingConvention::kind`] to compare it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CallingConvention: u8 {
        /// Native C calling convention
        const C = 0x01;
        /// Native stdcall calling convention
        const STDCALL = 0x02;
        /// Native thiscall calling convention
        const THISCALL = 0x03;
        /// Native fastcall calling convention
        const FASTCALL = 0x04;
        /// Managed vararg calling convention
        const VARARG = 0x05;
        /// Field signature
        const FIELD = 0x06;
        /// Local variable signature
        const LOCAL_SIG = 0x07;
        /// Property signature
        const PROPERTY = 0x08;
        /// Unmanaged calling convention
        const UNMANAGED = 0x09;
        /// Generic method instantiation signature
        const GENERIC_INST = 0x0A;
        /// Mask selecting the kind nibble
        const KIND_MASK = 0x0F;
        /// Method has generic parameters, their count follows the calling convention
        const GENERIC = 0x10;
        /// Instance method or property
        const HAS_THIS = 0x20;
        /// The `this` parameter is listed explicitly
        const EXPLICIT_THIS = 0x40;
    }
}

impl CallingConvention {
    /// The managed default calling convention, all bits clear
    pub const DEFAULT: CallingConvention = CallingConvention::empty();

    /// The kind stored in the low nibble
    #[must_use]
    pub fn kind(self) -> u8 {
        self.bits() & CallingConvention::KIND_MASK.bits()
    }

    /// True if the low nibble equals `kind`
    #[must_use]
    pub fn is_kind(self, kind: CallingConvention) -> bool {
        self.kind() == kind.bits()
    }
}

bitflags! {
    /// Context flags of the recursive type production. Each nesting level decides which
    /// constructs its child may contain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParseFlags: u8 {
        /// `CMOD_REQD` / `CMOD_OPT` chains may prefix the type
        const CUSTOM_MODIFIERS = 0x01;
        /// `PINNED` may prefix the type
        const PINNED = 0x02;
        /// `BYREF` may prefix the type
        const BY_REF = 0x04;
        /// `TYPEDBYREF` is accepted
        const TYPED_BY_REF = 0x08;
        /// `VOID` is accepted
        const VOID = 0x10;
        /// Bytes left over after the signature are malformed
        const MUST_BE_WHOLE_SIGNATURE = 0x20;
    }
}

impl ParseFlags {
    /// Flags of a parameter type
    pub const PARAM: ParseFlags = ParseFlags::CUSTOM_MODIFIERS
        .union(ParseFlags::BY_REF)
        .union(ParseFlags::TYPED_BY_REF);
    /// Flags of a return type
    pub const RETURN: ParseFlags = ParseFlags::PARAM.union(ParseFlags::VOID);
    /// Flags of a local variable type
    pub const LOCAL: ParseFlags = ParseFlags::PARAM.union(ParseFlags::PINNED);
}

/// A `CMOD_REQD` or `CMOD_OPT` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomModifier {
    /// `modreq` if true, `modopt` otherwise
    pub is_required: bool,
    /// `TypeDef`, `TypeRef` or `TypeSpec` of the modifier
    pub modifier_type: Token,
}

/// Array shape dimension; absent values were not encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArrayDimensions {
    /// Number of elements of this dimension
    pub size: Option<u32>,
    /// Lower bound of this dimension
    pub lower_bound: Option<i32>,
}

/// Represents a parsed type in various signatures
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type is referenced during runtime
    TypedByRef,
    /// CIL value-type
    ValueType(Token),
    /// CIL Class
    Class(Token),
    /// Generic type parameter
    GenericParamType(u32),
    /// Generic method parameter
    GenericParamMethod(u32),
    /// A pointer to a type
    Ptr(Box<TypeSignature>),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// A pinned local
    Pinned(Box<TypeSignature>),
    /// Single dimension array
    SzArray(Box<TypeSignature>),
    /// Array
    Array(SignatureArray),
    /// Function pointer
    FnPtr(Box<SignatureMethod>),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// A type carrying a custom modifier chain, outermost modifier first
    Modified(Vec<CustomModifier>, Box<TypeSignature>),
}

impl TypeSignature {
    /// The modifier chain directly attached to this type, if any
    #[must_use]
    pub fn modifiers(&self) -> &[CustomModifier] {
        match self {
            TypeSignature::Modified(modifiers, _) => modifiers,
            _ => &[],
        }
    }

    /// This type without its outermost modifier chain
    #[must_use]
    pub fn unmodified(&self) -> &TypeSignature {
        match self {
            TypeSignature::Modified(_, inner) => inner,
            other => other,
        }
    }

    /// True for a `BYREF` type, looking through modifiers
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        matches!(self.unmodified(), TypeSignature::ByRef(_))
    }

    /// True for a `PINNED` type, looking through modifiers
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self.unmodified(), TypeSignature::Pinned(_))
    }

    /// Append every type token this type refers to
    pub fn collect_tokens(&self, tokens: &mut Vec<Token>) {
        match self {
            TypeSignature::ValueType(token) | TypeSignature::Class(token) => tokens.push(*token),
            TypeSignature::Ptr(inner)
            | TypeSignature::ByRef(inner)
            | TypeSignature::Pinned(inner)
            | TypeSignature::SzArray(inner) => inner.collect_tokens(tokens),
            TypeSignature::Array(array) => array.base.collect_tokens(tokens),
            TypeSignature::FnPtr(method) => method.collect_tokens(tokens),
            TypeSignature::GenericInst(base, args) => {
                base.collect_tokens(tokens);
                for arg in args {
                    arg.collect_tokens(tokens);
                }
            }
            TypeSignature::Modified(modifiers, inner) => {
                tokens.extend(modifiers.iter().map(|m| m.modifier_type));
                inner.collect_tokens(tokens);
            }
            _ => {}
        }
    }
}

/// A general array (II.23.2.13)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureArray {
    /// The type in the array
    pub base: Box<TypeSignature>,
    /// The number of dimensions
    pub rank: u32,
    /// The encoded dimensions (can be less than `rank`, in order from 0..count)
    pub dimensions: Vec<ArrayDimensions>,
}

/// Parameter or return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureParameter {
    /// The type, including `BYREF` and modifiers
    pub base: TypeSignature,
}

/// Represents a method signature (II.23.2.1 - II.23.2.3)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureMethod {
    /// The raw calling convention
    pub calling_convention: CallingConvention,
    /// Number of generic parameters, 0 unless `GENERIC` is set
    pub param_count_generic: u32,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// All parameters, fixed ones first
    pub params: Vec<SignatureParameter>,
    /// Index into `params` where the variable part of a vararg call site begins
    pub sentinel: Option<usize>,
}

impl SignatureMethod {
    /// Instance method
    #[must_use]
    pub fn has_this(&self) -> bool {
        self.calling_convention.contains(CallingConvention::HAS_THIS)
    }

    /// `this` is listed explicitly
    #[must_use]
    pub fn explicit_this(&self) -> bool {
        self.calling_convention
            .contains(CallingConvention::EXPLICIT_THIS)
    }

    /// Vararg calling convention
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.calling_convention.is_kind(CallingConvention::VARARG)
    }

    /// Parameters before the sentinel
    #[must_use]
    pub fn fixed_params(&self) -> &[SignatureParameter] {
        &self.params[..self.sentinel.unwrap_or(self.params.len())]
    }

    /// Parameters after the sentinel
    #[must_use]
    pub fn varargs(&self) -> &[SignatureParameter] {
        &self.params[self.sentinel.unwrap_or(self.params.len())..]
    }

    fn collect_tokens(&self, tokens: &mut Vec<Token>) {
        self.return_type.base.collect_tokens(tokens);
        for param in &self.params {
            param.base.collect_tokens(tokens);
        }
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureField {
    /// The type of this field, including its modifiers
    pub base: TypeSignature,
}

/// Property signature (II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureProperty {
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The type of this property
    pub base: TypeSignature,
    /// The parameters of this property (indexers)
    pub params: Vec<SignatureParameter>,
}

/// Local variable signature (II.23.2.6)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureLocalVariables {
    /// The local variables
    pub locals: Vec<TypeSignature>,
}

/// Type specification signature (II.23.2.14)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureTypeSpec {
    /// Signature of this type
    pub base: TypeSignature,
}

/// Represents a method specification (II.23.2.15)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureMethodSpec {
    /// Types of the generic arguments
    pub generic_args: Vec<TypeSignature>,
}

/// Discriminant of [`Signature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SignatureKind {
    /// [`SignatureField`]
    Field,
    /// [`SignatureLocalVariables`]
    LocalVariables,
    /// [`SignatureProperty`]
    Property,
    /// [`SignatureMethodSpec`]
    MethodSpec,
    /// [`SignatureTypeSpec`]
    TypeSpec,
    /// [`SignatureMethod`]
    Method,
}

/// Any decoded signature blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// Field signature
    Field(SignatureField),
    /// Local variable list
    LocalVariables(SignatureLocalVariables),
    /// Property signature
    Property(SignatureProperty),
    /// Generic method instantiation
    MethodSpec(SignatureMethodSpec),
    /// Type specification
    TypeSpec(SignatureTypeSpec),
    /// Method definition, reference or stand-alone method signature
    Method(SignatureMethod),
}

macro_rules! narrow {
    ($name:ident, $variant:ident, $target:ty) => {
        #[doc = concat!("Narrow to a [`", stringify!($target), "`]")]
        ///
        /// # Errors
        /// Returns [`crate::Error::Malformed`] naming both kinds if this is another variant
        pub fn $name(self) -> Result<$target> {
            match self {
                Signature::$variant(inner) => Ok(inner),
                other => Err(other.mismatch(SignatureKind::$variant)),
            }
        }
    };
}

impl Signature {
    /// The variant of this signature
    #[must_use]
    pub fn kind(&self) -> SignatureKind {
        match self {
            Signature::Field(_) => SignatureKind::Field,
            Signature::LocalVariables(_) => SignatureKind::LocalVariables,
            Signature::Property(_) => SignatureKind::Property,
            Signature::MethodSpec(_) => SignatureKind::MethodSpec,
            Signature::TypeSpec(_) => SignatureKind::TypeSpec,
            Signature::Method(_) => SignatureKind::Method,
        }
    }

    fn mismatch(&self, expected: SignatureKind) -> crate::Error {
        malformed_error!(
            "Expected a {} signature, found {}",
            expected,
            self.kind()
        )
    }

    narrow!(into_field, Field, SignatureField);
    narrow!(into_local_variables, LocalVariables, SignatureLocalVariables);
    narrow!(into_property, Property, SignatureProperty);
    narrow!(into_method_spec, MethodSpec, SignatureMethodSpec);
    narrow!(into_type_spec, TypeSpec, SignatureTypeSpec);
    narrow!(into_method, Method, SignatureMethod);

    /// Every `TypeDef`, `TypeRef` and `TypeSpec` token referenced by this signature
    #[must_use]
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        match self {
            Signature::Field(field) => field.base.collect_tokens(&mut tokens),
            Signature::LocalVariables(locals) => {
                for local in &locals.locals {
                    local.collect_tokens(&mut tokens);
                }
            }
            Signature::Property(property) => {
                property.base.collect_tokens(&mut tokens);
                for param in &property.params {
                    param.base.collect_tokens(&mut tokens);
                }
            }
            Signature::MethodSpec(spec) => {
                for arg in &spec.generic_args {
                    arg.collect_tokens(&mut tokens);
                }
            }
            Signature::TypeSpec(spec) => spec.base.collect_tokens(&mut tokens),
            Signature::Method(method) => method.collect_tokens(&mut tokens),
        }
        tokens
    }
}
