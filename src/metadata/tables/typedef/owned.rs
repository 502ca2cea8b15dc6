use std::{ops::Range, sync::OnceLock};

use crate::metadata::{
    tables::{MetadataObject, TableId, TypeAttributes},
    token::Token,
};

/// A type defined in this module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Type name
    pub name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Base type: a `TypeDef`, `TypeRef` or `TypeSpec`; `None` for interfaces and `System.Object`
    pub extends: Option<Token>,
    /// Rows of the `Field` table owned by this type
    pub fields: Range<u32>,
    /// Rows of the `MethodDef` table owned by this type
    pub methods: Range<u32>,
}

impl TypeDef {
    /// `Namespace.Name`, or just the name without a namespace
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// True if the type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags & TypeAttributes::INTERFACE != 0
    }

    /// Tokens of the owned fields
    pub fn field_tokens(&self) -> impl Iterator<Item = Token> {
        self.fields
            .clone()
            .map(|rid| Token::from_parts(TableId::Field, rid))
    }

    /// Tokens of the owned methods
    pub fn method_tokens(&self) -> impl Iterator<Item = Token> {
        self.methods
            .clone()
            .map(|rid| Token::from_parts(TableId::MethodDef, rid))
    }
}

/// Links registered on a `TypeDef` by other rows
#[derive(Debug, Default)]
pub struct TypeDefLinks {
    pub(crate) class_layout: OnceLock<Token>,
    pub(crate) enclosing: OnceLock<Token>,
}

impl MetadataObject<TypeDef> {
    /// The `ClassLayout` row describing this type, if any
    #[must_use]
    pub fn class_layout(&self) -> Option<Token> {
        self.links.class_layout.get().copied()
    }

    /// The enclosing type of a nested type, as registered by `NestedClass`
    #[must_use]
    pub fn enclosing_type(&self) -> Option<Token> {
        self.links.enclosing.get().copied()
    }
}
