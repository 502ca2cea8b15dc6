use crate::metadata::signatures::SignatureTypeSpec;

/// A constructed type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// The decoded type
    pub signature: SignatureTypeSpec,
}
