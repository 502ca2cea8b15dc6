use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::TypeSpec;

impl RowContent for TypeSpec {
    const TABLE: TableId = TableId::TypeSpec;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.type_spec
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(TypeSpec {
            signature: context
                .signature(row.value(0)?, true, row.token())?
                .into_type_spec()?,
        })
    }
}
