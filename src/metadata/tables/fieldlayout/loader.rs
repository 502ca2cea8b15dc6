use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{register_link, Field, MetadataTable, ModuleTables, RowContent, RowData, TableId},
        token::Token,
    },
    Result,
};

use super::FieldLayout;

impl RowContent for FieldLayout {
    const TABLE: TableId = TableId::FieldLayout;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.field_layout
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(FieldLayout {
            field_offset: row.value(0)?,
            field: context.resolve::<Field>(row.value(1)?, row.token())?,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        let field = context.object::<Field>(self.field, token)?;
        register_link(&field.links.layout, token, "Layout", self.field)
    }
}
