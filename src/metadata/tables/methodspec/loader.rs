use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{CodedIndexType, MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::MethodSpec;

impl RowContent for MethodSpec {
    const TABLE: TableId = TableId::MethodSpec;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.method_spec
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(MethodSpec {
            method: context.resolve_coded_required(
                CodedIndexType::MethodDefOrRef,
                row.value(0)?,
                row.token(),
            )?,
            instantiation: context
                .signature(row.value(1)?, false, row.token())?
                .into_method_spec()?,
        })
    }
}
