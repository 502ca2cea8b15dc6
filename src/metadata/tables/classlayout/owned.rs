use crate::metadata::token::Token;

/// Packing and size of a type with sequential or explicit layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    /// Field alignment: 0 or a power of two up to 128
    pub packing_size: u32,
    /// Size of the type in bytes, 0 if unspecified
    pub class_size: u32,
    /// The `TypeDef` this layout applies to
    pub parent: Token,
}
