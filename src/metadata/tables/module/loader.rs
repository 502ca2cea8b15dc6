use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::Module;

impl RowContent for Module {
    const TABLE: TableId = TableId::Module;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.module
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(Module {
            generation: row.value(0)?,
            name: context.string(row.value(1)?)?,
            mvid: context.guid(row.value(2)?)?,
            enc_id: context.guid(row.value(3)?)?,
            enc_base_id: context.guid(row.value(4)?)?,
        })
    }
}
