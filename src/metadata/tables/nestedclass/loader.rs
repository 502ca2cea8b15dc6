use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{register_link, MetadataTable, ModuleTables, RowContent, RowData, TableId, TypeDef},
        token::Token,
    },
    Result,
};

use super::NestedClass;

impl RowContent for NestedClass {
    const TABLE: TableId = TableId::NestedClass;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.nested_class
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        let nested_class = context.resolve::<TypeDef>(row.value(0)?, row.token())?;
        let enclosing_class = context.resolve::<TypeDef>(row.value(1)?, row.token())?;
        if nested_class == enclosing_class {
            return Err(malformed_error!(
                "NestedClass {} nests {} inside itself",
                row.token(),
                nested_class
            ));
        }

        Ok(NestedClass {
            nested_class,
            enclosing_class,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        let nested = context.object::<TypeDef>(self.nested_class, token)?;
        register_link(
            &nested.links.enclosing,
            self.enclosing_class,
            "Enclosing type",
            self.nested_class,
        )
    }
}
