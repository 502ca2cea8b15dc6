//! The `TypeDef` table (II.22.37).
//!
//! Each row defines a type and owns a contiguous run of `Field` and `MethodDef` rows, delimited
//! by its own list start and the list start of the following row.

mod loader;
mod owned;

pub use owned::*;

#[allow(non_snake_case)]
/// Flags of the `TypeDef` table (II.23.1.15)
pub mod TypeAttributes {
    /// Visibility bits
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Not visible outside the assembly
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Visible outside the assembly
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested, public
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested, private
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Layout bits
    pub const LAYOUT_MASK: u32 = 0x0000_0018;
    /// Fields are laid out automatically
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;
    /// Fields are laid out sequentially
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Field offsets come from the `FieldLayout` table
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Type is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Type cannot be derived from
    pub const SEALED: u32 = 0x0000_0100;
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
}
