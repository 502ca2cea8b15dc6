use crate::{
    metadata::{
        loader::LoaderContext,
        signatures::Signature,
        tables::{CodedIndexType, MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::{MemberRef, MemberRefSignature};

impl RowContent for MemberRef {
    const TABLE: TableId = TableId::MemberRef;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.member_ref
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        let signature = match context.signature(row.value(2)?, false, row.token())? {
            Signature::Method(method) => MemberRefSignature::Method(method),
            Signature::Field(field) => MemberRefSignature::Field(field),
            other => {
                return Err(malformed_error!(
                    "Expected a Method or Field signature for {}, found {}",
                    row.token(),
                    other.kind()
                ))
            }
        };

        Ok(MemberRef {
            class: context.resolve_coded_required(
                CodedIndexType::MemberRefParent,
                row.value(0)?,
                row.token(),
            )?,
            name: context.string(row.value(1)?)?,
            signature,
        })
    }
}
