use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::ModuleRef;

impl RowContent for ModuleRef {
    const TABLE: TableId = TableId::ModuleRef;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.module_ref
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(ModuleRef {
            name: context.string(row.value(0)?)?,
        })
    }
}
