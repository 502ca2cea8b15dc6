use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{register_link, MetadataTable, ModuleTables, RowContent, RowData, TableId, TypeDef},
        token::Token,
    },
    Result,
};

use super::ClassLayout;

impl RowContent for ClassLayout {
    const TABLE: TableId = TableId::ClassLayout;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.class_layout
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        let packing_size = row.value(0)?;
        if packing_size > 128 || (packing_size != 0 && !packing_size.is_power_of_two()) {
            return Err(malformed_error!(
                "ClassLayout {} has invalid packing size {}",
                row.token(),
                packing_size
            ));
        }

        Ok(ClassLayout {
            packing_size,
            class_size: row.value(1)?,
            parent: context.resolve::<TypeDef>(row.value(2)?, row.token())?,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        let parent = context.object::<TypeDef>(self.parent, token)?;
        register_link(&parent.links.class_layout, token, "ClassLayout", self.parent)
    }
}
