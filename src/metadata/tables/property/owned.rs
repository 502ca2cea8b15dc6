use crate::metadata::signatures::SignatureProperty;

/// A property of a type defined in this module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// `PropertyAttributes` bitmask
    pub flags: u32,
    /// Property name
    pub name: String,
    /// Decoded property type and indexer parameters
    pub signature: SignatureProperty,
}
