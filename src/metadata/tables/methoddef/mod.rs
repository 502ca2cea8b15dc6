//! The `MethodDef` table (II.22.26).
//!
//! Each row owns a contiguous run of `Param` rows, delimited the same way as the field and method
//! lists of `TypeDef`.

mod loader;
mod owned;

pub use owned::*;

#[allow(non_snake_case)]
/// Flags of the `MethodDef` table (II.23.1.10)
pub mod MethodAttributes {
    /// Accessibility bits
    pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by anyone who has visibility to this scope
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Method cannot be overridden
    pub const FINAL: u32 = 0x0020;
    /// Method is virtual
    pub const VIRTUAL: u32 = 0x0040;
    /// Method has no implementation
    pub const ABSTRACT: u32 = 0x0400;
    /// Implementation is forwarded through `PInvoke`
    pub const PINVOKE_IMPL: u32 = 0x2000;
}
