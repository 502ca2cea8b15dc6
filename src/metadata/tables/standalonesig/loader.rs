use crate::{
    metadata::{
        loader::LoaderContext,
        signatures::Signature,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::{StandAloneSig, StandAloneSignature};

impl RowContent for StandAloneSig {
    const TABLE: TableId = TableId::StandAloneSig;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.stand_alone_sig
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        let signature = match context.signature(row.value(0)?, false, row.token())? {
            Signature::LocalVariables(locals) => StandAloneSignature::LocalVariables(locals),
            Signature::Method(method) => StandAloneSignature::Method(method),
            other => {
                return Err(malformed_error!(
                    "Expected a LocalVariables or Method signature for {}, found {}",
                    row.token(),
                    other.kind()
                ))
            }
        };

        Ok(StandAloneSig { signature })
    }
}
