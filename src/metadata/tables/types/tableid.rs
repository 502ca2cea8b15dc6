//! Identifiers of the ECMA-335 metadata tables.
//!
//! The discriminant of every [`TableId`] is its table number (II.22), which is also the bit position
//! in the tables-stream presence bitmap and the high byte of a [`crate::metadata::token::Token`].
//! Iterating with [`strum::IntoEnumIterator`] yields the tables in declaration order, which is the
//! order their rows are laid out in the tables stream.

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// A metadata table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// `Module` - 0x00
    Module = 0x00,
    /// `TypeRef` - 0x01
    TypeRef = 0x01,
    /// `TypeDef` - 0x02
    TypeDef = 0x02,
    /// `FieldPtr` - 0x03, only present in uncompressed streams
    FieldPtr = 0x03,
    /// `Field` - 0x04
    Field = 0x04,
    /// `MethodPtr` - 0x05, only present in uncompressed streams
    MethodPtr = 0x05,
    /// `MethodDef` - 0x06
    MethodDef = 0x06,
    /// `ParamPtr` - 0x07, only present in uncompressed streams
    ParamPtr = 0x07,
    /// `Param` - 0x08
    Param = 0x08,
    /// `InterfaceImpl` - 0x09
    InterfaceImpl = 0x09,
    /// `MemberRef` - 0x0A
    MemberRef = 0x0A,
    /// `Constant` - 0x0B
    Constant = 0x0B,
    /// `CustomAttribute` - 0x0C
    CustomAttribute = 0x0C,
    /// `FieldMarshal` - 0x0D
    FieldMarshal = 0x0D,
    /// `DeclSecurity` - 0x0E
    DeclSecurity = 0x0E,
    /// `ClassLayout` - 0x0F
    ClassLayout = 0x0F,
    /// `FieldLayout` - 0x10
    FieldLayout = 0x10,
    /// `StandAloneSig` - 0x11
    StandAloneSig = 0x11,
    /// `EventMap` - 0x12
    EventMap = 0x12,
    /// `EventPtr` - 0x13, only present in uncompressed streams
    EventPtr = 0x13,
    /// `Event` - 0x14
    Event = 0x14,
    /// `PropertyMap` - 0x15
    PropertyMap = 0x15,
    /// `PropertyPtr` - 0x16, only present in uncompressed streams
    PropertyPtr = 0x16,
    /// `Property` - 0x17
    Property = 0x17,
    /// `MethodSemantics` - 0x18
    MethodSemantics = 0x18,
    /// `MethodImpl` - 0x19
    MethodImpl = 0x19,
    /// `ModuleRef` - 0x1A
    ModuleRef = 0x1A,
    /// `TypeSpec` - 0x1B
    TypeSpec = 0x1B,
    /// `ImplMap` - 0x1C
    ImplMap = 0x1C,
    /// `FieldRVA` - 0x1D
    FieldRVA = 0x1D,
    /// `EncLog` - 0x1E, edit-and-continue only
    EncLog = 0x1E,
    /// `EncMap` - 0x1F, edit-and-continue only
    EncMap = 0x1F,
    /// `Assembly` - 0x20
    Assembly = 0x20,
    /// `AssemblyProcessor` - 0x21
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` - 0x22
    AssemblyOS = 0x22,
    /// `AssemblyRef` - 0x23
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` - 0x24
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` - 0x25
    AssemblyRefOS = 0x25,
    /// `File` - 0x26
    File = 0x26,
    /// `ExportedType` - 0x27
    ExportedType = 0x27,
    /// `ManifestResource` - 0x28
    ManifestResource = 0x28,
    /// `NestedClass` - 0x29
    NestedClass = 0x29,
    /// `GenericParam` - 0x2A
    GenericParam = 0x2A,
    /// `MethodSpec` - 0x2B
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` - 0x2C
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Look up a table by its number
    #[must_use]
    pub fn from_id(id: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == id)
    }

    /// Tables that only exist in uncompressed (`#-`) or edit-and-continue streams
    #[must_use]
    pub fn is_indirection_or_enc(&self) -> bool {
        matches!(
            self,
            TableId::FieldPtr
                | TableId::MethodPtr
                | TableId::ParamPtr
                | TableId::EventPtr
                | TableId::PropertyPtr
                | TableId::EncLog
                | TableId::EncMap
        )
    }

    /// Tables whose rows cannot be decoded in a meaningful way unless the returned tables exist.
    ///
    /// A row of `self` always points into one of these; the bitmap is inconsistent when `self` is
    /// present and none of them is.
    #[must_use]
    pub fn requires(&self) -> &'static [TableId] {
        match self {
            TableId::FieldLayout | TableId::FieldRVA => &[TableId::Field],
            TableId::FieldMarshal => &[TableId::Field, TableId::Param],
            TableId::ClassLayout
            | TableId::NestedClass
            | TableId::InterfaceImpl
            | TableId::EventMap
            | TableId::PropertyMap
            | TableId::MethodImpl => &[TableId::TypeDef],
            TableId::MethodSemantics => &[TableId::MethodDef],
            TableId::ImplMap => &[TableId::ModuleRef],
            TableId::MethodSpec => &[TableId::MethodDef, TableId::MemberRef],
            TableId::GenericParamConstraint => &[TableId::GenericParam],
            TableId::AssemblyRefProcessor | TableId::AssemblyRefOS => &[TableId::AssemblyRef],
            _ => &[],
        }
    }
}
