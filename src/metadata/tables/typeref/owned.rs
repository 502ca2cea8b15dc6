use crate::metadata::token::Token;

/// A reference to a type defined elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// `Module`, `ModuleRef`, `AssemblyRef` or enclosing `TypeRef`; `None` when the type is
    /// looked up through the `ExportedType` table
    pub resolution_scope: Option<Token>,
    /// Type name
    pub name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
}

impl TypeRef {
    /// `Namespace.Name`, or just the name without a namespace
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}
