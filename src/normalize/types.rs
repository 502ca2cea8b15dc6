//! Canonical signatures and the hash-consing tables that make them unique.
//!
//! Every normalized signature node is stored behind an [`Interned`] handle produced by an
//! [`Interner`]. Children are themselves interned, so two handles compare equal exactly when they
//! point at the same instance, and structural equality of a freshly built draft only has to look
//! one level deep.

use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use dashmap::DashMap;
use strum::Display;

use crate::metadata::signatures::{ArrayDimensions, CallingConvention, TypeSignature};

/// A shared handle on a canonical instance, compared and hashed by identity
pub struct Interned<T>(Arc<T>);

impl<T> Interned<T> {
    /// True if both handles point at the same instance
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for Interned<T> {
    fn clone(&self) -> Self {
        Interned(Arc::clone(&self.0))
    }
}

impl<T> Deref for Interned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> PartialEq for Interned<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for Interned<T> {}

impl<T> Hash for Interned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Interned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hash-consing table for one kind of canonical value
pub struct Interner<T> {
    entries: DashMap<Arc<T>, ()>,
}

impl<T: Eq + Hash> Interner<T> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Interner {
            entries: DashMap::new(),
        }
    }

    /// The canonical instance structurally equal to `draft`
    ///
    /// Returns the previously registered instance if there is one and drops `draft`; otherwise
    /// `draft` becomes the canonical instance.
    pub fn make_unique(&self, draft: T) -> Interned<T> {
        if let Some(existing) = self.entries.get(&draft) {
            return Interned(Arc::clone(existing.key()));
        }

        let entry = self.entries.entry(Arc::new(draft)).or_default();
        Interned(Arc::clone(entry.key()))
    }

    /// Number of canonical instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was interned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Eq + Hash> Default for Interner<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of a normalized type definition or external type in the context's type arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Position in the arena
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Built-in element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PrimitiveType {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// UTF-16 code unit
    Char,
    /// Signed 8-bit integer
    I1,
    /// Unsigned 8-bit integer
    U1,
    /// Signed 16-bit integer
    I2,
    /// Unsigned 16-bit integer
    U2,
    /// Signed 32-bit integer
    I4,
    /// Unsigned 32-bit integer
    U4,
    /// Signed 64-bit integer
    I8,
    /// Unsigned 64-bit integer
    U8,
    /// 32-bit float
    R4,
    /// 64-bit float
    R8,
    /// Native signed integer
    I,
    /// Native unsigned integer
    U,
    /// `System.String`
    String,
    /// `System.Object`
    Object,
    /// Typed reference
    TypedByRef,
}

impl PrimitiveType {
    /// The primitive encoded by `signature`, if it is one
    #[must_use]
    pub fn from_signature(signature: &TypeSignature) -> Option<PrimitiveType> {
        Some(match signature {
            TypeSignature::Void => PrimitiveType::Void,
            TypeSignature::Boolean => PrimitiveType::Boolean,
            TypeSignature::Char => PrimitiveType::Char,
            TypeSignature::I1 => PrimitiveType::I1,
            TypeSignature::U1 => PrimitiveType::U1,
            TypeSignature::I2 => PrimitiveType::I2,
            TypeSignature::U2 => PrimitiveType::U2,
            TypeSignature::I4 => PrimitiveType::I4,
            TypeSignature::U4 => PrimitiveType::U4,
            TypeSignature::I8 => PrimitiveType::I8,
            TypeSignature::U8 => PrimitiveType::U8,
            TypeSignature::R4 => PrimitiveType::R4,
            TypeSignature::R8 => PrimitiveType::R8,
            TypeSignature::I => PrimitiveType::I,
            TypeSignature::U => PrimitiveType::U,
            TypeSignature::String => PrimitiveType::String,
            TypeSignature::Object => PrimitiveType::Object,
            TypeSignature::TypedByRef => PrimitiveType::TypedByRef,
            _ => return None,
        })
    }
}

/// A `modreq` or `modopt` on a normalized type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedModifier {
    /// `modreq` if true
    pub is_required: bool,
    /// The modifier type
    pub modifier: Interned<TypeSig>,
}

/// A canonical type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    /// A built-in element type
    Primitive(PrimitiveType),
    /// A reference type, defined locally or elsewhere
    Class(TypeId),
    /// A value type, defined locally or elsewhere
    ValueType(TypeId),
    /// Generic parameter of the enclosing type
    GenericParam(u32),
    /// Generic parameter of the enclosing method
    MethodGenericParam(u32),
    /// Unmanaged pointer
    Pointer(Interned<TypeSig>),
    /// Managed reference
    ByRef(Interned<TypeSig>),
    /// Pinned local
    Pinned(Interned<TypeSig>),
    /// Single-dimension, zero-based array
    SzArray(Interned<TypeSig>),
    /// General array
    Array {
        /// Element type
        element: Interned<TypeSig>,
        /// Number of dimensions
        rank: u32,
        /// Encoded sizes and lower bounds
        dimensions: Vec<ArrayDimensions>,
    },
    /// Function pointer
    FunctionPointer(Interned<MethodSig>),
    /// Instantiated generic type
    GenericInstance {
        /// The generic definition
        base: Interned<TypeSig>,
        /// Type arguments
        args: Vec<Interned<TypeSig>>,
    },
    /// A type carrying custom modifiers, outermost first
    Modified {
        /// The modifiers
        modifiers: Vec<NormalizedModifier>,
        /// The modified type
        inner: Interned<TypeSig>,
    },
}

impl TypeSig {
    /// The named type this signature denotes directly, if any
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            TypeSig::Class(id) | TypeSig::ValueType(id) => Some(*id),
            _ => None,
        }
    }
}

/// A canonical method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    /// Calling convention as encoded
    pub calling_convention: CallingConvention,
    /// Number of generic parameters
    pub generic_param_count: u32,
    /// Return type
    pub return_type: Interned<TypeSig>,
    /// Parameter types, fixed ones first
    pub params: Vec<Interned<TypeSig>>,
    /// Where the variable part of a vararg call site begins
    pub sentinel: Option<usize>,
}

/// A canonical local-variable list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalsSig {
    /// Local types in slot order
    pub locals: Vec<Interned<TypeSig>>,
}

/// A canonical generic method instantiation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstantiationSig {
    /// Always [`CallingConvention::DEFAULT`] for instantiations built by the normalizer
    pub calling_convention: CallingConvention,
    /// Type arguments
    pub args: Vec<Interned<TypeSig>>,
}

/// A canonical property signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySig {
    /// Instance property
    pub has_this: bool,
    /// Property type
    pub property_type: Interned<TypeSig>,
    /// Indexer parameters
    pub params: Vec<Interned<TypeSig>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_drafts_collapse() {
        let interner = Interner::new();
        let a = interner.make_unique(TypeSig::Primitive(PrimitiveType::I4));
        let b = interner.make_unique(TypeSig::Primitive(PrimitiveType::I4));
        let c = interner.make_unique(TypeSig::Primitive(PrimitiveType::I8));

        assert!(Interned::ptr_eq(&a, &b));
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn nested_drafts_collapse_through_children() {
        let interner = Interner::new();
        let element = interner.make_unique(TypeSig::Class(TypeId(3)));
        let first = interner.make_unique(TypeSig::SzArray(element.clone()));

        let element_again = interner.make_unique(TypeSig::Class(TypeId(3)));
        let second = interner.make_unique(TypeSig::SzArray(element_again));

        assert!(Interned::ptr_eq(&first, &second));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn identity_hash_and_eq() {
        use std::collections::HashSet;

        let a = Interned(Arc::new(TypeSig::Primitive(PrimitiveType::Object)));
        let b = Interned(Arc::new(TypeSig::Primitive(PrimitiveType::Object)));
        assert_ne!(a, b);

        let set: HashSet<_> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn primitive_mapping() {
        assert_eq!(
            PrimitiveType::from_signature(&TypeSignature::TypedByRef),
            Some(PrimitiveType::TypedByRef)
        );
        assert_eq!(PrimitiveType::from_signature(&TypeSignature::GenericParamType(0)), None);
    }
}
