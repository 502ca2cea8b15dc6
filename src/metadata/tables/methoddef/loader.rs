use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{register_link, MetadataTable, ModuleTables, Param, RowContent, RowData, TableId},
        token::Token,
    },
    Result,
};

use super::{MethodDef, MethodDefLinks};

impl RowContent for MethodDef {
    const TABLE: TableId = TableId::MethodDef;
    type Links = MethodDefLinks;

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.method_def
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(MethodDef {
            rva: row.value(0)?,
            impl_flags: row.value(1)?,
            flags: row.value(2)?,
            name: context.string(row.value(3)?)?,
            signature: context
                .signature(row.value(4)?, false, row.token())?
                .into_method()?,
            params: context.list_range(row, 5, TableId::Param)?,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        if !context.options.ownership_links {
            return Ok(());
        }

        for param in self.param_tokens() {
            let param = context.object::<Param>(param, token)?;
            register_link(&param.links.owner, token, "Owner", param.token())?;
        }
        Ok(())
    }
}
