//! Metadata Loader Module
//!
//! Drives the import of one module's tables: every modeled table is allocated first, then filled
//! row by row in table order through its [`MetadataLoader`]. Each filled row immediately registers
//! its back-links on the rows it refers to.
//!
//! Rows of tables without an object model are skipped with an info diagnostic, or rejected when
//! [`crate::ImportOptions::strict_tables`] is set.

mod context;

pub(crate) use context::LoaderContext;

use std::marker::PhantomData;

use strum::IntoEnumIterator;

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        tables::{
            AssemblyRef, ClassLayout, Field, FieldLayout, FieldMarshal, MemberRef, MethodDef,
            MethodSpec, Module, ModuleRef, NestedClass, Param, Property, RowContent, StandAloneSig,
            TableId, TypeDef, TypeRef, TypeSpec,
        },
    },
    Result,
};

static LOADERS: [&'static dyn MetadataLoader; 17] = [
    &TableLoader::<Module>::NEW,
    &TableLoader::<TypeRef>::NEW,
    &TableLoader::<TypeDef>::NEW,
    &TableLoader::<Field>::NEW,
    &TableLoader::<MethodDef>::NEW,
    &TableLoader::<Param>::NEW,
    &TableLoader::<MemberRef>::NEW,
    &TableLoader::<FieldMarshal>::NEW,
    &TableLoader::<ClassLayout>::NEW,
    &TableLoader::<FieldLayout>::NEW,
    &TableLoader::<StandAloneSig>::NEW,
    &TableLoader::<Property>::NEW,
    &TableLoader::<ModuleRef>::NEW,
    &TableLoader::<TypeSpec>::NEW,
    &TableLoader::<AssemblyRef>::NEW,
    &TableLoader::<NestedClass>::NEW,
    &TableLoader::<MethodSpec>::NEW,
];

trait MetadataLoader: Send + Sync {
    fn load(&self, context: &LoaderContext<'_>) -> Result<()>;

    fn table_id(&self) -> TableId;
}

struct TableLoader<D>(PhantomData<fn() -> D>);

impl<D> TableLoader<D> {
    const NEW: Self = TableLoader(PhantomData);
}

impl<D: RowContent> MetadataLoader for TableLoader<D> {
    fn load(&self, context: &LoaderContext<'_>) -> Result<()> {
        let table = context.tables.table::<D>();
        if table.is_empty() {
            return Ok(());
        }

        let _span =
            tracing::debug_span!("load_table", table = %D::TABLE, rows = table.len()).entered();

        for object in table {
            context.options.check_cancelled()?;

            let Some(row) = context.row(D::TABLE, object.token().row())? else {
                return Err(malformed_error!("Row {} has no data", object.token()));
            };

            let content = D::fill(&row, context)?;
            content.apply(object.token(), context)?;
            object.set_content(content)?;
        }

        Ok(())
    }

    fn table_id(&self) -> TableId {
        D::TABLE
    }
}

/// Fill every allocated placeholder of `context.tables`
pub(crate) fn load_tables(context: &LoaderContext<'_>) -> Result<()> {
    let mut loaders = LOADERS.iter().peekable();

    for table in TableId::iter() {
        match loaders.peek() {
            Some(loader) if loader.table_id() == table => {
                loader.load(context)?;
                loaders.next();
            }
            _ => skip_table(table, context)?,
        }
    }

    Ok(())
}

fn skip_table(table: TableId, context: &LoaderContext<'_>) -> Result<()> {
    let rows = context.rows(table);
    if rows == 0 {
        return Ok(());
    }

    if context.options.strict_tables {
        return Err(malformed_error!(
            "Table {} with {} rows is not supported",
            table,
            rows
        ));
    }

    context.diagnostics.info(
        DiagnosticCategory::Table,
        format!("Skipped {rows} rows of table {table}"),
    );
    Ok(())
}
