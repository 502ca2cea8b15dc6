//! An imported module.
//!
//! [`CilModule`] is the raw object graph of one module: every row of every modeled table as a
//! filled [`MetadataObject`], together with the diagnostics collected during the import. It owns
//! all of its data; the input buffer can be dropped once the import returns.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilnorm::{metadata::{cilmodule::CilModule, tables::TypeDef}, ImportOptions};
//!
//! let data = std::fs::read("module.metadata")?;
//! let module = CilModule::from_metadata("module", &data, &ImportOptions::default())?;
//! for type_def in module.table::<TypeDef>() {
//!     println!("{}", type_def.content()?.full_name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    config::ImportOptions,
    metadata::{
        diagnostics::Diagnostics,
        loader::{load_tables, LoaderContext},
        root::Root,
        streams::{Blob, Guid, Strings, TablesHeader},
        tables::{
            MetadataObject, MetadataTable, Module, ModuleTables, RowContent, TableId, TableInfoRef,
        },
        token::Token,
    },
    Result,
};

/// The streams an import reads, already split out of the metadata root
#[derive(Clone, Copy, Debug, Default)]
pub struct MetadataStreams<'a> {
    /// The compressed `#~` tables stream
    pub tables: &'a [u8],
    /// `#Strings`, if present
    pub strings: Option<&'a [u8]>,
    /// `#Blob`, if present
    pub blob: Option<&'a [u8]>,
    /// `#GUID`, if present
    pub guid: Option<&'a [u8]>,
}

/// The imported raw metadata of one module
pub struct CilModule {
    name: String,
    runtime_version: Option<String>,
    info: TableInfoRef,
    tables: ModuleTables,
    diagnostics: Arc<Diagnostics>,
}

impl CilModule {
    /// Import a module from its metadata, starting at the `BSJB` root
    ///
    /// # Errors
    /// Returns a malformed-format error for a damaged root, heap or table, an unresolved-reference
    /// error for a row index outside its table, and [`crate::Error::SilentAbort`] when cancelled
    pub fn from_metadata(name: &str, data: &[u8], options: &ImportOptions) -> Result<CilModule> {
        let root = Root::read(data)?;

        if root.stream("#-").is_some() {
            return Err(malformed_error!(
                "Uncompressed #- tables stream is not supported"
            ));
        }

        let Some(tables) = root.stream("#~") else {
            return Err(malformed_error!("Metadata of {} has no #~ tables stream", name));
        };

        let streams = MetadataStreams {
            tables,
            strings: root.stream("#Strings"),
            blob: root.stream("#Blob"),
            guid: root.stream("#GUID"),
        };

        Self::import(name, Some(root.version.clone()), &streams, options)
    }

    /// Import a module from streams that were already located
    ///
    /// # Errors
    /// See [`CilModule::from_metadata`]
    pub fn from_streams(
        name: &str,
        streams: &MetadataStreams<'_>,
        options: &ImportOptions,
    ) -> Result<CilModule> {
        Self::import(name, None, streams, options)
    }

    fn import(
        name: &str,
        runtime_version: Option<String>,
        streams: &MetadataStreams<'_>,
        options: &ImportOptions,
    ) -> Result<CilModule> {
        let _span = tracing::debug_span!("import_module", module = name).entered();

        let header = TablesHeader::from(streams.tables)?;
        for table in TableId::iter().filter(TableId::is_indirection_or_enc) {
            if header.info.rows(table) > 0 {
                return Err(malformed_error!(
                    "Table {} is only valid in uncompressed or edit-and-continue metadata",
                    table
                ));
            }
        }

        let strings = streams.strings.map(Strings::from).transpose()?.unwrap_or_default();
        let blobs = streams.blob.map(Blob::from).transpose()?.unwrap_or_default();
        let guids = streams.guid.map(Guid::from).transpose()?.unwrap_or_default();

        let tables = ModuleTables::allocate(&header.info);
        let diagnostics = Arc::new(Diagnostics::new());

        let context = LoaderContext {
            header: &header,
            strings,
            blobs,
            guids,
            tables: &tables,
            options,
            diagnostics: &diagnostics,
        };
        load_tables(&context)?;

        tracing::debug!(
            module = name,
            tables = header.table_count(),
            diagnostics = diagnostics.count(),
            "module imported"
        );

        Ok(CilModule {
            name: name.to_string(),
            runtime_version,
            info: header.info.clone(),
            tables,
            diagnostics,
        })
    }

    /// The name the module was imported under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runtime version string of the metadata root, if imported from one
    #[must_use]
    pub fn runtime_version(&self) -> Option<&str> {
        self.runtime_version.as_deref()
    }

    /// Row counts of all tables, modeled or not
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// All modeled tables
    #[must_use]
    pub fn tables(&self) -> &ModuleTables {
        &self.tables
    }

    /// The table of `D`
    #[must_use]
    pub fn table<D: RowContent>(&self) -> &MetadataTable<D> {
        self.tables.table::<D>()
    }

    /// The object `token` identifies, if it is a row of `D`'s table
    #[must_use]
    pub fn get<D: RowContent>(&self, token: Token) -> Option<&MetadataObject<D>> {
        self.tables.table::<D>().by_token(token)
    }

    /// The content of the `Module` row
    #[must_use]
    pub fn module(&self) -> Option<&Module> {
        self.tables
            .module
            .get(1)
            .and_then(|module| module.content().ok())
    }

    /// Diagnostics recorded while importing
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }
}

/// Import independent modules in parallel
///
/// Each module gets its own cursor, object model and diagnostics; the results are in input order.
#[must_use]
pub fn import_modules(inputs: &[(&str, &[u8])], options: &ImportOptions) -> Vec<Result<CilModule>> {
    inputs
        .par_iter()
        .map(|(name, data)| CilModule::from_metadata(name, data, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            marshalling::MarshalSpec,
            tables::{CodedIndexType, Field, FieldLayout, MethodDef, TypeDef},
        },
        test::builder::{sig, MetadataBuilder},
        CancellationFlag,
    };

    fn two_types() -> MetadataBuilder {
        let mut builder = MetadataBuilder::new();
        let runtime = builder.assembly_ref("System.Runtime");
        let object = builder.type_ref(runtime, "System", "Object");

        builder.type_def("Zoo", "Animal", Some(object));
        builder.field("legs", &sig::field(&[sig::I4]));
        builder.field("name", &sig::field(&[sig::STRING]));
        builder.method("Speak", &sig::method(0x20, &[sig::VOID], &[]));

        builder.type_def("Zoo", "Keeper", Some(object));
        builder.field("animals", &sig::field(&sig::sz_array(&[sig::OBJECT])));
        builder
    }

    #[test]
    fn imports_root_and_module_row() {
        let module = two_types().build_module();

        assert_eq!(module.name(), "test");
        assert_eq!(module.runtime_version(), Some("v4.0.30319"));
        assert_eq!(module.module().unwrap().name, "test.dll");
        assert_eq!(module.table::<TypeDef>().len(), 2);
        assert_eq!(module.table::<Field>().len(), 3);
        assert_eq!(module.info().rows(TableId::AssemblyRef), 1);
    }

    #[test]
    fn list_columns_become_ranges() {
        let module = two_types().build_module();

        let animal = module.table::<TypeDef>().get(1).unwrap().content().unwrap();
        assert_eq!(animal.full_name(), "Zoo.Animal");
        assert_eq!(animal.fields, 1..3);
        assert_eq!(animal.methods, 1..2);

        let keeper = module.table::<TypeDef>().get(2).unwrap().content().unwrap();
        assert_eq!(keeper.fields, 3..4);
        assert!(keeper.methods.is_empty());
    }

    #[test]
    fn method_row_decodes_every_column() {
        let mut builder = two_types();
        builder.param(1, "volume");
        let module = builder.build_module();

        let speak = module.table::<MethodDef>().get(1).unwrap();
        let content = speak.content().unwrap();
        assert_eq!(content.rva, 0);
        assert_eq!(content.impl_flags, 0);
        assert_eq!(content.flags, 0x0006);
        assert_eq!(content.name, "Speak");
        assert!(content.signature.has_this());
        assert!(content.signature.params.is_empty());
        assert_eq!(content.params, 1..2);
        assert_eq!(speak.owner(), Some(Token::from_parts(TableId::TypeDef, 1)));
    }

    #[test]
    fn forward_reference_resolves_to_later_row() {
        let mut builder = MetadataBuilder::new();
        let derived_base = Token::from_parts(TableId::TypeDef, 2);
        let derived = builder.type_def("Shapes", "Square", Some(derived_base));
        let base = builder.type_def("Shapes", "Rectangle", None);
        assert_eq!(base, derived_base);

        let module = builder.build_module();
        let square = module.get::<TypeDef>(derived).unwrap().content().unwrap();
        let target = module.get::<TypeDef>(square.extends.unwrap()).unwrap();

        assert!(std::ptr::eq(target, module.table::<TypeDef>().get(2).unwrap()));
        assert_eq!(target.content().unwrap().name, "Rectangle");
    }

    #[test]
    fn field_layout_links_only_its_field() {
        let mut builder = two_types();
        let layout = builder.field_layout(2, 8);
        let module = builder.build_module();

        let fields = module.table::<Field>();
        assert_eq!(fields.get(2).unwrap().layout(), Some(layout));
        assert_eq!(fields.get(1).unwrap().layout(), None);
        assert_eq!(fields.get(3).unwrap().layout(), None);

        let row = module.get::<FieldLayout>(layout).unwrap().content().unwrap();
        assert_eq!(row.field_offset, 8);
        assert_eq!(row.field, fields.get(2).unwrap().token());
    }

    #[test]
    fn field_marshal_decodes_and_links() {
        let mut builder = two_types();
        let name = Token::from_parts(TableId::Field, 2);
        let marshal = builder.field_marshal(name, &[0x17, 0x20]);
        let module = builder.build_module();

        assert_eq!(module.get::<Field>(name).unwrap().marshal(), Some(marshal));
        assert_eq!(
            module.tables().field_marshal.get(1).unwrap().content().unwrap().native_type,
            MarshalSpec::FixedString { size: 0x20 }
        );
    }

    #[test]
    fn unknown_marshal_kind_is_malformed() {
        let mut builder = two_types();
        builder.field_marshal(Token::from_parts(TableId::Field, 1), &[0x7F]);

        let error = builder
            .build_module_with(&ImportOptions::default())
            .err()
            .unwrap();
        assert!(error.is_malformed(), "{error}");
    }

    #[test]
    fn ownership_links_follow_options() {
        let builder = two_types();

        let module = builder.build_module();
        let animal = Token::from_parts(TableId::TypeDef, 1);
        let keeper = Token::from_parts(TableId::TypeDef, 2);
        let fields = module.table::<Field>();
        assert_eq!(fields.get(1).unwrap().owner(), Some(animal));
        assert_eq!(fields.get(2).unwrap().owner(), Some(animal));
        assert_eq!(fields.get(3).unwrap().owner(), Some(keeper));
        assert_eq!(module.table::<MethodDef>().get(1).unwrap().owner(), Some(animal));

        let minimal = builder.build_module_with(&ImportOptions::minimal()).unwrap();
        assert!(minimal.table::<Field>().iter().all(|field| field.owner().is_none()));
    }

    #[test]
    fn out_of_range_row_is_unresolved() {
        let mut builder = two_types();
        builder.field_layout(9, 0);

        let error = builder
            .build_module_with(&ImportOptions::default())
            .err()
            .unwrap();
        assert!(error.is_unresolved(), "{error}");
    }

    #[test]
    fn unmodeled_tables_are_skipped_or_rejected() {
        let mut builder = two_types();
        let field = MetadataBuilder::coded(
            CodedIndexType::HasConstant,
            Token::from_parts(TableId::Field, 1),
        );
        let value = builder.blob(&4_i32.to_le_bytes());
        builder.row(TableId::Constant, &[u32::from(sig::I4), 0, field, value]);

        let module = builder.build_module();
        assert_eq!(module.info().rows(TableId::Constant), 1);
        assert!(module
            .diagnostics()
            .iter()
            .any(|diagnostic| diagnostic.message.contains("Constant")));

        let error = builder
            .build_module_with(&ImportOptions::strict())
            .err()
            .unwrap();
        assert!(error.is_malformed(), "{error}");
    }

    #[test]
    fn uncompressed_tables_are_rejected() {
        let error = MetadataBuilder::new()
            .uncompressed()
            .build_module_with(&ImportOptions::default())
            .err()
            .unwrap();

        assert!(error.is_malformed());
        assert!(error.to_string().contains("#-"), "{error}");
    }

    #[test]
    fn cancelled_import_aborts_silently() {
        let flag = CancellationFlag::new();
        flag.cancel();

        let error = two_types()
            .build_module_with(&ImportOptions::default().with_cancellation(flag))
            .err()
            .unwrap();
        assert!(error.is_silent_abort());
    }

    #[test]
    fn parallel_import_keeps_input_order() {
        let good = two_types().build();
        let mut broken = good.clone();
        broken[0] = 0;

        let results = import_modules(
            &[
                ("good", good.as_slice()),
                ("broken", broken.as_slice()),
                ("again", good.as_slice()),
            ],
            &ImportOptions::default(),
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().name(), "good");
        assert!(results[1].as_ref().err().unwrap().is_malformed());
        assert_eq!(results[2].as_ref().unwrap().table::<TypeDef>().len(), 2);
    }

    #[test]
    fn from_streams_skips_the_root() {
        let builder = two_types();
        let data = builder.build();
        let root = Root::read(&data).unwrap();

        let streams = MetadataStreams {
            tables: root.stream("#~").unwrap(),
            strings: root.stream("#Strings"),
            blob: root.stream("#Blob"),
            guid: root.stream("#GUID"),
        };
        let module = CilModule::from_streams("bare", &streams, &ImportOptions::default()).unwrap();

        assert_eq!(module.runtime_version(), None);
        assert_eq!(module.table::<Field>().len(), 3);
    }
}
