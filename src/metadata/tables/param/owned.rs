use std::sync::OnceLock;

use crate::metadata::{tables::MetadataObject, token::Token};

/// Name and flags of a method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// `ParamAttributes` bitmask
    pub flags: u32,
    /// 0 for the return value, otherwise the 1-based parameter position
    pub sequence: u32,
    /// Parameter name, may be empty
    pub name: String,
}

/// Links registered on a `Param` by other rows
#[derive(Debug, Default)]
pub struct ParamLinks {
    pub(crate) marshal: OnceLock<Token>,
    pub(crate) owner: OnceLock<Token>,
}

impl MetadataObject<Param> {
    /// The `FieldMarshal` row of this parameter, if any
    #[must_use]
    pub fn marshal(&self) -> Option<Token> {
        self.links.marshal.get().copied()
    }

    /// The `MethodDef` whose parameter list contains this row
    #[must_use]
    pub fn owner(&self) -> Option<Token> {
        self.links.owner.get().copied()
    }
}
