//! The normalized object graph.
//!
//! Types live in an arena addressed by [`TypeId`]; members are shared through `Arc`. Parts that are
//! only known after a later phase sit in `OnceLock`s and are set exactly once by the phase that
//! computes them.

use std::sync::{Arc, OnceLock};

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{marshalling::MarshalSpec, token::Token},
    normalize::types::{
        InstantiationSig, Interned, LocalsSig, MethodSig, PropertySig, TypeId, TypeSig,
    },
};

/// Explicit layout of a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLayout {
    /// Field alignment, 0 for the default
    pub packing_size: u32,
    /// Total size in bytes, 0 if unspecified
    pub class_size: u32,
}

/// A type defined in the module being normalized
#[derive(Debug)]
pub struct NormalizedTypeDef {
    /// The `TypeDef` row
    pub token: Token,
    /// Simple name
    pub name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// `TypeAttributes`
    pub flags: u32,
    pub(crate) extends: OnceLock<Option<Interned<TypeSig>>>,
    pub(crate) value_type: OnceLock<bool>,
    pub(crate) enclosing: OnceLock<Option<TypeId>>,
    pub(crate) layout: OnceLock<Option<TypeLayout>>,
    pub(crate) fields: OnceLock<Vec<Arc<NormalizedField>>>,
    pub(crate) methods: OnceLock<Vec<Arc<NormalizedMethod>>>,
}

impl NormalizedTypeDef {
    pub(crate) fn new(token: Token, name: String, namespace: String, flags: u32) -> Self {
        NormalizedTypeDef {
            token,
            name,
            namespace,
            flags,
            extends: OnceLock::new(),
            value_type: OnceLock::new(),
            enclosing: OnceLock::new(),
            layout: OnceLock::new(),
            fields: OnceLock::new(),
            methods: OnceLock::new(),
        }
    }

    /// `Namespace.Name`, or just the name without a namespace
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }

    /// The base type; `None` until the hierarchy phase ran or for types without one
    #[must_use]
    pub fn extends(&self) -> Option<&Interned<TypeSig>> {
        self.extends.get().and_then(Option::as_ref)
    }

    /// True if the base type is `System.ValueType` or `System.Enum`
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.value_type.get().copied().unwrap_or(false)
    }

    /// The enclosing type of a nested type
    #[must_use]
    pub fn enclosing(&self) -> Option<TypeId> {
        self.enclosing.get().copied().flatten()
    }

    /// Explicit layout, if the type has one
    #[must_use]
    pub fn layout(&self) -> Option<TypeLayout> {
        self.layout.get().copied().flatten()
    }

    /// Fields in declaration order; empty until the field phase ran
    #[must_use]
    pub fn fields(&self) -> &[Arc<NormalizedField>] {
        self.fields.get().map_or(&[], Vec::as_slice)
    }

    /// Methods in declaration order; empty until the method phase ran
    #[must_use]
    pub fn methods(&self) -> &[Arc<NormalizedMethod>] {
        self.methods.get().map_or(&[], Vec::as_slice)
    }
}

/// Where an external type is defined
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeScope {
    /// Another assembly, by display name
    Assembly(String),
    /// Another module of the same assembly
    Module(String),
    /// Nested in another external type
    Nested(TypeId),
}

/// A type defined outside of the module being normalized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedTypeRef {
    /// Defining scope
    pub scope: TypeScope,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Simple name
    pub name: String,
}

impl NormalizedTypeRef {
    /// `Namespace.Name`, or just the name without a namespace
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }
}

/// An entry of the type arena
#[derive(Debug)]
pub enum NormalizedType {
    /// Defined in this module
    Definition(NormalizedTypeDef),
    /// Defined elsewhere; one entry per distinct external type
    Reference(NormalizedTypeRef),
}

impl NormalizedType {
    /// The simple name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            NormalizedType::Definition(def) => &def.name,
            NormalizedType::Reference(reference) => &reference.name,
        }
    }

    /// `Namespace.Name`
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            NormalizedType::Definition(def) => def.full_name(),
            NormalizedType::Reference(reference) => reference.full_name(),
        }
    }

    /// The definition, if the type is defined locally
    #[must_use]
    pub fn as_definition(&self) -> Option<&NormalizedTypeDef> {
        match self {
            NormalizedType::Definition(def) => Some(def),
            NormalizedType::Reference(_) => None,
        }
    }
}

/// A field definition
#[derive(Debug)]
pub struct NormalizedField {
    /// The `Field` row
    pub token: Token,
    /// Name
    pub name: String,
    /// `FieldAttributes`
    pub flags: u32,
    /// Field type
    pub field_type: Interned<TypeSig>,
    /// Declaring type, absent when ownership links were not computed
    pub owner: Option<TypeId>,
    /// Explicit offset from `FieldLayout`
    pub offset: Option<u32>,
    /// Native marshaling from `FieldMarshal`
    pub marshal: Option<MarshalSpec>,
}

/// A method definition
#[derive(Debug)]
pub struct NormalizedMethod {
    /// The `MethodDef` row
    pub token: Token,
    /// Name
    pub name: String,
    /// `MethodAttributes`
    pub flags: u32,
    /// `MethodImplAttributes`
    pub impl_flags: u32,
    /// Relative virtual address of the body, 0 if none
    pub rva: u32,
    /// Signature
    pub signature: Interned<MethodSig>,
    /// Declaring type, absent when ownership links were not computed
    pub owner: Option<TypeId>,
    pub(crate) param_names: OnceLock<Vec<Option<String>>>,
}

impl NormalizedMethod {
    /// Parameter names by sequence number, index 0 naming the return value
    ///
    /// Empty until parameter names were completed.
    #[must_use]
    pub fn param_names(&self) -> &[Option<String>] {
        self.param_names.get().map_or(&[], Vec::as_slice)
    }

    /// Name of the parameter at 1-based `sequence`
    #[must_use]
    pub fn param_name(&self, sequence: usize) -> Option<&str> {
        self.param_names().get(sequence)?.as_deref()
    }
}

/// Signature of a referenced member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberSig {
    /// A field type
    Field(Interned<TypeSig>),
    /// A method signature
    Method(Interned<MethodSig>),
}

/// What a member reference is attached to when it is not bound to a local definition
#[derive(Debug, Clone)]
pub enum MemberParent {
    /// A type defined elsewhere, or a constructed type
    Type(Interned<TypeSig>),
    /// The global scope of another module
    Module(String),
    /// A vararg call site of a local method
    Method(Arc<NormalizedMethod>),
}

/// A member reference that is not bound to a local definition
#[derive(Debug)]
pub struct MemberReference {
    /// The `MemberRef` row
    pub token: Token,
    /// The parent
    pub parent: MemberParent,
    /// Member name
    pub name: String,
    /// Member signature
    pub signature: MemberSig,
}

/// The target of a member reference or method instantiation
#[derive(Debug, Clone)]
pub enum NormalizedMember {
    /// A local field
    Field(Arc<NormalizedField>),
    /// A local method
    Method(Arc<NormalizedMethod>),
    /// A member of an external or constructed type
    Reference(Arc<MemberReference>),
}

/// A generic method instantiation
#[derive(Debug)]
pub struct NormalizedMethodSpec {
    /// The `MethodSpec` row
    pub token: Token,
    /// The generic method
    pub method: NormalizedMember,
    /// The type arguments
    pub instantiation: Interned<InstantiationSig>,
}

/// A stand-alone signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedStandAlone {
    /// Local variables of a method body
    Locals(Interned<LocalsSig>),
    /// An indirect call site
    Method(Interned<MethodSig>),
}

/// A property definition
#[derive(Debug)]
pub struct NormalizedProperty {
    /// The `Property` row
    pub token: Token,
    /// Name
    pub name: String,
    /// `PropertyAttributes`
    pub flags: u32,
    /// Signature
    pub signature: Interned<PropertySig>,
}

/// The normalized counterpart of a raw object
#[derive(Debug, Clone)]
pub enum NormalizedObject {
    /// A type definition or an external type
    Type(TypeId),
    /// A constructed type from a `TypeSpec`
    Constructed(Interned<TypeSig>),
    /// A field definition
    Field(Arc<NormalizedField>),
    /// A method definition
    Method(Arc<NormalizedMethod>),
    /// A member reference
    Member(NormalizedMember),
    /// A generic method instantiation
    MethodSpec(Arc<NormalizedMethodSpec>),
    /// A stand-alone signature
    StandAlone(NormalizedStandAlone),
    /// A property
    Property(Arc<NormalizedProperty>),
}

impl NormalizedObject {
    /// Short name of the variant, for messages
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            NormalizedObject::Type(_) => "type",
            NormalizedObject::Constructed(_) => "constructed type",
            NormalizedObject::Field(_) => "field",
            NormalizedObject::Method(_) => "method",
            NormalizedObject::Member(_) => "member reference",
            NormalizedObject::MethodSpec(_) => "method instantiation",
            NormalizedObject::StandAlone(_) => "stand-alone signature",
            NormalizedObject::Property(_) => "property",
        }
    }
}

/// The result of a normalization run, handed to the driver
pub struct NormalizedGraph {
    pub(crate) types: boxcar::Vec<NormalizedType>,
    pub(crate) objects: SkipMap<Token, NormalizedObject>,
}

impl NormalizedGraph {
    /// The type at `id`
    #[must_use]
    pub fn type_info(&self, id: TypeId) -> Option<&NormalizedType> {
        self.types.get(id.0)
    }

    /// All types in arena order
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &NormalizedType)> {
        self.types.iter().map(|(index, ty)| (TypeId(index), ty))
    }

    /// The counterpart of the raw object `token`
    #[must_use]
    pub fn get(&self, token: Token) -> Option<NormalizedObject> {
        self.objects.get(&token).map(|entry| entry.value().clone())
    }

    /// All counterparts, ordered by raw token
    pub fn objects(&self) -> impl Iterator<Item = (Token, NormalizedObject)> + '_ {
        self.objects
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
    }

    /// Number of normalized objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if nothing was normalized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}
