use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{
            register_link, CodedIndexType, Field, MetadataTable, MethodDef, ModuleTables,
            RowContent, RowData, TableId,
        },
        token::Token,
    },
    Result,
};

use super::{TypeDef, TypeDefLinks};

impl RowContent for TypeDef {
    const TABLE: TableId = TableId::TypeDef;
    type Links = TypeDefLinks;

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.type_def
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(TypeDef {
            flags: row.value(0)?,
            name: context.string(row.value(1)?)?,
            namespace: context.string(row.value(2)?)?,
            extends: context.resolve_coded(
                CodedIndexType::TypeDefOrRef,
                row.value(3)?,
                row.token(),
            )?,
            fields: context.list_range(row, 4, TableId::Field)?,
            methods: context.list_range(row, 5, TableId::MethodDef)?,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        if !context.options.ownership_links {
            return Ok(());
        }

        for rid in self.fields.clone() {
            let field = context.object::<Field>(Token::from_parts(TableId::Field, rid), token)?;
            register_link(&field.links.owner, token, "Owner", field.token())?;
        }

        for rid in self.methods.clone() {
            let method =
                context.object::<MethodDef>(Token::from_parts(TableId::MethodDef, rid), token)?;
            register_link(&method.links.owner, token, "Owner", method.token())?;
        }

        Ok(())
    }
}
