use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::{Param, ParamLinks};

impl RowContent for Param {
    const TABLE: TableId = TableId::Param;
    type Links = ParamLinks;

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.param
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(Param {
            flags: row.value(0)?,
            sequence: row.value(1)?,
            name: context.string(row.value(2)?)?,
        })
    }
}
