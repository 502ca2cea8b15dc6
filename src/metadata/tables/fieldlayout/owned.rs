use crate::metadata::token::Token;

/// The byte offset of a field inside its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Offset from the start of the instance
    pub field_offset: u32,
    /// The `Field` being placed
    pub field: Token,
}
