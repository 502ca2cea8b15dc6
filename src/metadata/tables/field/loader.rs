use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::{Field, FieldLinks};

impl RowContent for Field {
    const TABLE: TableId = TableId::Field;
    type Links = FieldLinks;

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.field
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(Field {
            flags: row.value(0)?,
            name: context.string(row.value(1)?)?,
            signature: context
                .signature(row.value(2)?, false, row.token())?
                .into_field()?,
        })
    }
}
