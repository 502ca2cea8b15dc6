use crate::{
    metadata::{
        loader::LoaderContext,
        marshalling::parse_marshalling_descriptor,
        tables::{
            register_link, CodedIndexType, Field, MetadataTable, ModuleTables, Param, RowContent,
            RowData, TableId,
        },
        token::Token,
    },
    Result,
};

use super::FieldMarshal;

impl RowContent for FieldMarshal {
    const TABLE: TableId = TableId::FieldMarshal;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.field_marshal
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(FieldMarshal {
            parent: context.resolve_coded_required(
                CodedIndexType::HasFieldMarshal,
                row.value(0)?,
                row.token(),
            )?,
            native_type: parse_marshalling_descriptor(context.blob(row.value(1)?)?)?,
        })
    }

    fn apply(&self, token: Token, context: &LoaderContext<'_>) -> Result<()> {
        match self.parent.table_id() {
            Some(TableId::Field) => {
                let field = context.object::<Field>(self.parent, token)?;
                register_link(&field.links.marshal, token, "Marshal", self.parent)
            }
            Some(TableId::Param) => {
                let param = context.object::<Param>(self.parent, token)?;
                register_link(&param.links.marshal, token, "Marshal", self.parent)
            }
            _ => Err(malformed_error!(
                "FieldMarshal {} has parent {} which is neither a field nor a parameter",
                token,
                self.parent
            )),
        }
    }
}
