use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::Property;

impl RowContent for Property {
    const TABLE: TableId = TableId::Property;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.property
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(Property {
            flags: row.value(0)?,
            name: context.string(row.value(1)?)?,
            signature: context
                .signature(row.value(2)?, false, row.token())?
                .into_property()?,
        })
    }
}
