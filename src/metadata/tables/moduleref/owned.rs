/// A reference to another module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    /// File name of the module
    pub name: String,
}
