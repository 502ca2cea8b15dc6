//! Metadata tables.
//!
//! Every modeled table lives in its own module holding the decoded row content (`owned`) and the
//! [`RowContent`] implementation that fills it from the raw columns (`loader`). Tables without an
//! object model are still sized by [`TableSchemas`] so the rows after them can be located, but
//! their rows are not decoded.
//!
//! All rows of all modeled tables are allocated as [`MetadataObject`] placeholders before the
//! first row is filled, so a row may refer to any other row by token regardless of table order.

mod assemblyref;
mod classlayout;
mod field;
mod fieldlayout;
mod fieldmarshal;
mod memberref;
mod methoddef;
mod methodspec;
mod module;
mod moduleref;
mod nestedclass;
mod param;
mod property;
mod standalonesig;
mod typedef;
mod typeref;
mod types;
mod typespec;

pub use assemblyref::*;
pub use classlayout::*;
pub use field::*;
pub use fieldlayout::*;
pub use fieldmarshal::*;
pub use memberref::*;
pub use methoddef::*;
pub use methodspec::*;
pub use module::*;
pub use moduleref::*;
pub use nestedclass::*;
pub use param::*;
pub use property::*;
pub use standalonesig::*;
pub use typedef::*;
pub use typeref::*;
pub use types::*;
pub use typespec::*;

/// The placeholders of every modeled table of one module
#[derive(Default)]
pub struct ModuleTables {
    /// `Module` (0x00)
    pub module: MetadataTable<Module>,
    /// `TypeRef` (0x01)
    pub type_ref: MetadataTable<TypeRef>,
    /// `TypeDef` (0x02)
    pub type_def: MetadataTable<TypeDef>,
    /// `Field` (0x04)
    pub field: MetadataTable<Field>,
    /// `MethodDef` (0x06)
    pub method_def: MetadataTable<MethodDef>,
    /// `Param` (0x08)
    pub param: MetadataTable<Param>,
    /// `MemberRef` (0x0A)
    pub member_ref: MetadataTable<MemberRef>,
    /// `FieldMarshal` (0x0D)
    pub field_marshal: MetadataTable<FieldMarshal>,
    /// `ClassLayout` (0x0F)
    pub class_layout: MetadataTable<ClassLayout>,
    /// `FieldLayout` (0x10)
    pub field_layout: MetadataTable<FieldLayout>,
    /// `StandAloneSig` (0x11)
    pub stand_alone_sig: MetadataTable<StandAloneSig>,
    /// `Property` (0x17)
    pub property: MetadataTable<Property>,
    /// `ModuleRef` (0x1A)
    pub module_ref: MetadataTable<ModuleRef>,
    /// `TypeSpec` (0x1B)
    pub type_spec: MetadataTable<TypeSpec>,
    /// `AssemblyRef` (0x23)
    pub assembly_ref: MetadataTable<AssemblyRef>,
    /// `NestedClass` (0x29)
    pub nested_class: MetadataTable<NestedClass>,
    /// `MethodSpec` (0x2B)
    pub method_spec: MetadataTable<MethodSpec>,
}

impl ModuleTables {
    /// Allocate a placeholder for every row counted in `info`
    #[must_use]
    pub fn allocate(info: &TableInfo) -> Self {
        ModuleTables {
            module: MetadataTable::allocate(info.rows(TableId::Module)),
            type_ref: MetadataTable::allocate(info.rows(TableId::TypeRef)),
            type_def: MetadataTable::allocate(info.rows(TableId::TypeDef)),
            field: MetadataTable::allocate(info.rows(TableId::Field)),
            method_def: MetadataTable::allocate(info.rows(TableId::MethodDef)),
            param: MetadataTable::allocate(info.rows(TableId::Param)),
            member_ref: MetadataTable::allocate(info.rows(TableId::MemberRef)),
            field_marshal: MetadataTable::allocate(info.rows(TableId::FieldMarshal)),
            class_layout: MetadataTable::allocate(info.rows(TableId::ClassLayout)),
            field_layout: MetadataTable::allocate(info.rows(TableId::FieldLayout)),
            stand_alone_sig: MetadataTable::allocate(info.rows(TableId::StandAloneSig)),
            property: MetadataTable::allocate(info.rows(TableId::Property)),
            module_ref: MetadataTable::allocate(info.rows(TableId::ModuleRef)),
            type_spec: MetadataTable::allocate(info.rows(TableId::TypeSpec)),
            assembly_ref: MetadataTable::allocate(info.rows(TableId::AssemblyRef)),
            nested_class: MetadataTable::allocate(info.rows(TableId::NestedClass)),
            method_spec: MetadataTable::allocate(info.rows(TableId::MethodSpec)),
        }
    }

    /// Shorthand for `D::table(self)`
    #[must_use]
    pub fn table<D: RowContent>(&self) -> &MetadataTable<D> {
        D::table(self)
    }

    /// True if `table` has an object model
    #[must_use]
    pub fn is_modeled(table: TableId) -> bool {
        matches!(
            table,
            TableId::Module
                | TableId::TypeRef
                | TableId::TypeDef
                | TableId::Field
                | TableId::MethodDef
                | TableId::Param
                | TableId::MemberRef
                | TableId::FieldMarshal
                | TableId::ClassLayout
                | TableId::FieldLayout
                | TableId::StandAloneSig
                | TableId::Property
                | TableId::ModuleRef
                | TableId::TypeSpec
                | TableId::AssemblyRef
                | TableId::NestedClass
                | TableId::MethodSpec
        )
    }
}
