use crate::{
    metadata::{
        loader::LoaderContext,
        tables::{MetadataTable, ModuleTables, RowContent, RowData, TableId},
    },
    Result,
};

use super::AssemblyRef;

impl RowContent for AssemblyRef {
    const TABLE: TableId = TableId::AssemblyRef;
    type Links = ();

    fn table(tables: &ModuleTables) -> &MetadataTable<Self> {
        &tables.assembly_ref
    }

    fn fill(row: &RowData<'_>, context: &LoaderContext<'_>) -> Result<Self> {
        Ok(AssemblyRef {
            major_version: row.value(0)?,
            minor_version: row.value(1)?,
            build_number: row.value(2)?,
            revision_number: row.value(3)?,
            flags: row.value(4)?,
            public_key_or_token: context.blob(row.value(5)?)?.to_vec(),
            name: context.string(row.value(6)?)?,
            culture: context.string(row.value(7)?)?,
            hash_value: context.blob(row.value(8)?)?.to_vec(),
        })
    }
}
