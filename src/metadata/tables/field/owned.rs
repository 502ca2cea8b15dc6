use std::sync::OnceLock;

use crate::metadata::{
    signatures::SignatureField,
    tables::{FieldAttributes, MetadataObject},
    token::Token,
};

/// A field of a type defined in this module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// `FieldAttributes` bitmask
    pub flags: u32,
    /// Field name
    pub name: String,
    /// Decoded type of the field
    pub signature: SignatureField,
}

impl Field {
    /// True for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & FieldAttributes::STATIC != 0
    }
}

/// Links registered on a `Field` by other rows
#[derive(Debug, Default)]
pub struct FieldLinks {
    pub(crate) layout: OnceLock<Token>,
    pub(crate) marshal: OnceLock<Token>,
    pub(crate) owner: OnceLock<Token>,
}

impl MetadataObject<Field> {
    /// The `FieldLayout` row giving this field an explicit offset, if any
    #[must_use]
    pub fn layout(&self) -> Option<Token> {
        self.links.layout.get().copied()
    }

    /// The `FieldMarshal` row of this field, if any
    #[must_use]
    pub fn marshal(&self) -> Option<Token> {
        self.links.marshal.get().copied()
    }

    /// The `TypeDef` whose field list contains this field
    #[must_use]
    pub fn owner(&self) -> Option<Token> {
        self.links.owner.get().copied()
    }
}
