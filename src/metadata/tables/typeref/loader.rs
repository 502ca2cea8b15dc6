use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{CodedIndexType, MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::TypeRef;

impl RowContent for TypeRef {
    const TABLE: TableId = TableId::TypeRef;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.type_ref
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(TypeRef {
            resolution_scope: context.resolve_coded(
                CodedIndexType::ResolutionScope,
                row.value(0)?,
                row.token(),
            )?,
            name: context.string(row.value(1)?)?,
            namespace: context.string(row.value(2)?)?,
        })
    }
}
