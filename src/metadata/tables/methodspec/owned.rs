use crate::metadata::{signatures::SignatureMethodSpec, token::Token};

/// A generic method together with its type arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    /// The generic `MethodDef` or `MemberRef`
    pub method: Token,
    /// The type arguments
    pub instantiation: SignatureMethodSpec,
}
