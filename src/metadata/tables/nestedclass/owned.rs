use crate::metadata::token::Token;

/// Nesting of one type inside another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedClass {
    /// The nested `TypeDef`
    pub nested_class: Token,
    /// The `TypeDef` it is declared in
    pub enclosing_class: Token,
}
