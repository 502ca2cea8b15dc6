use crate::metadata::{
    signatures::{SignatureField, SignatureMethod},
    token::Token,
};

/// The signature of a referenced member, which also tells whether it is a field or a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRefSignature {
    /// The member is a method
    Method(SignatureMethod),
    /// The member is a field
    Field(SignatureField),
}

/// A reference to a field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or `TypeSpec` the member belongs to
    pub class: Token,
    /// Member name
    pub name: String,
    /// Field or method signature
    pub signature: MemberRefSignature,
}

impl MemberRef {
    /// True if the referenced member is a field
    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.signature, MemberRefSignature::Field(_))
    }
}
