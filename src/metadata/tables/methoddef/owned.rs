use std::{ops::Range, sync::OnceLock};

use crate::metadata::{
    signatures::SignatureMethod,
    tables::{MetadataObject, MethodAttributes, TableId},
    token::Token,
};

/// A method defined in this module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    /// Relative virtual address of the body, 0 if there is none
    pub rva: u32,
    /// `MethodImplAttributes` bitmask
    pub impl_flags: u32,
    /// `MethodAttributes` bitmask
    pub flags: u32,
    /// Method name
    pub name: String,
    /// Decoded method signature
    pub signature: SignatureMethod,
    /// Rows of the `Param` table owned by this method
    pub params: Range<u32>,
}

impl MethodDef {
    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & MethodAttributes::STATIC != 0
    }

    /// Tokens of the owned parameter rows
    pub fn param_tokens(&self) -> impl Iterator<Item = Token> {
        self.params
            .clone()
            .map(|rid| Token::from_parts(TableId::Param, rid))
    }
}

/// Links registered on a `MethodDef` by other rows
#[derive(Debug, Default)]
pub struct MethodDefLinks {
    pub(crate) owner: OnceLock<Token>,
}

impl MetadataObject<MethodDef> {
    /// The `TypeDef` whose method list contains this method
    #[must_use]
    pub fn owner(&self) -> Option<Token> {
        self.links.owner.get().copied()
    }
}
