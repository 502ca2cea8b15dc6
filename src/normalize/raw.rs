//! Kind-tagged handles on the rows of an imported module.

use strum::{Display, EnumCount, EnumIter};

use crate::{
    metadata::{
        cilmodule::CilModule,
        tables::{
            AssemblyRef, ClassLayout, Field, FieldLayout, FieldMarshal, MemberRef, MetadataObject,
            MethodDef, MethodSpec, Module, ModuleRef, NestedClass, Param, Property, StandAloneSig,
            TableId, TypeDef, TypeRef, TypeSpec,
        },
        token::Token,
    },
    normalize::NormalizationPhase,
};

use NormalizationPhase::{
    CompletionOfMethodNormalization, CompletionOfTypeNormalization, CreationOfFieldDefinitions,
    CreationOfMethodDefinitions, CreationOfTypeDefinitions, CreationOfTypeHierarchy,
    ResolutionOfTypeReferences,
};

macro_rules! raw_objects {
    ($($kind:ident => $field:ident),+ $(,)?) => {
        /// The kind of a raw metadata object, one per modeled table
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
        pub enum RawObjectKind {
            $(
                #[doc = concat!("A `", stringify!($kind), "` row")]
                $kind,
            )+
        }

        impl RawObjectKind {
            /// The kind of the rows of `table`, `None` for tables without an object model
            #[must_use]
            pub fn from_table(table: TableId) -> Option<RawObjectKind> {
                match table {
                    $(TableId::$kind => Some(RawObjectKind::$kind),)+
                    _ => None,
                }
            }

            /// The table rows of this kind come from
            #[must_use]
            pub fn table(self) -> TableId {
                match self {
                    $(RawObjectKind::$kind => TableId::$kind,)+
                }
            }
        }

        /// A borrowed raw object of any kind
        #[derive(Clone, Copy)]
        pub enum RawObject<'m> {
            $(
                #[doc = concat!("A `", stringify!($kind), "` row")]
                $kind(&'m MetadataObject<$kind>),
            )+
        }

        impl<'m> RawObject<'m> {
            /// The kind tag of this object
            #[must_use]
            pub fn kind(&self) -> RawObjectKind {
                match self {
                    $(RawObject::$kind(_) => RawObjectKind::$kind,)+
                }
            }

            /// The identity of this object
            #[must_use]
            pub fn token(&self) -> Token {
                match self {
                    $(RawObject::$kind(object) => object.token(),)+
                }
            }

            /// The object `token` identifies in `module`
            #[must_use]
            pub fn from_token(module: &'m CilModule, token: Token) -> Option<RawObject<'m>> {
                match RawObjectKind::from_table(token.table_id()?)? {
                    $(
                        RawObjectKind::$kind => module
                            .tables()
                            .$field
                            .by_token(token)
                            .map(RawObject::$kind),
                    )+
                }
            }

            /// Every object of `kind` in `module`, in row order
            pub fn all_of(
                module: &'m CilModule,
                kind: RawObjectKind,
            ) -> Box<dyn Iterator<Item = RawObject<'m>> + 'm> {
                match kind {
                    $(
                        RawObjectKind::$kind => {
                            Box::new(module.tables().$field.iter().map(RawObject::$kind))
                        }
                    )+
                }
            }
        }

        impl std::fmt::Debug for RawObject<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", self.kind(), self.token())
            }
        }
    };
}

raw_objects! {
    Module => module,
    TypeRef => type_ref,
    TypeDef => type_def,
    Field => field,
    MethodDef => method_def,
    Param => param,
    MemberRef => member_ref,
    FieldMarshal => field_marshal,
    ClassLayout => class_layout,
    FieldLayout => field_layout,
    StandAloneSig => stand_alone_sig,
    Property => property,
    ModuleRef => module_ref,
    TypeSpec => type_spec,
    AssemblyRef => assembly_ref,
    NestedClass => nested_class,
    MethodSpec => method_spec,
}

impl RawObjectKind {
    /// The phases in which `allocate_normalized` accepts objects of this kind
    ///
    /// Kinds without a normalized counterpart of their own return an empty set; their content is
    /// folded into the objects that refer to them.
    #[must_use]
    pub fn allocation_phases(self) -> &'static [NormalizationPhase] {
        match self {
            RawObjectKind::TypeDef => &[CreationOfTypeDefinitions],
            RawObjectKind::TypeRef | RawObjectKind::TypeSpec => &[ResolutionOfTypeReferences],
            RawObjectKind::Field => &[CreationOfFieldDefinitions],
            RawObjectKind::MethodDef => &[CreationOfMethodDefinitions],
            RawObjectKind::MemberRef
            | RawObjectKind::MethodSpec
            | RawObjectKind::StandAloneSig
            | RawObjectKind::Property => &[CompletionOfMethodNormalization],
            RawObjectKind::Module
            | RawObjectKind::ModuleRef
            | RawObjectKind::AssemblyRef
            | RawObjectKind::FieldMarshal
            | RawObjectKind::FieldLayout
            | RawObjectKind::ClassLayout
            | RawObjectKind::NestedClass
            | RawObjectKind::Param => &[],
        }
    }

    /// The phases in which `execute_phase` accepts objects of this kind
    #[must_use]
    pub fn execution_phases(self) -> &'static [NormalizationPhase] {
        match self {
            RawObjectKind::TypeDef => &[
                CreationOfTypeHierarchy,
                CompletionOfTypeNormalization,
                CreationOfFieldDefinitions,
                CreationOfMethodDefinitions,
            ],
            RawObjectKind::MethodDef => &[CompletionOfMethodNormalization],
            _ => &[],
        }
    }

    /// True if `allocate_normalized` accepts this kind in `phase`
    #[must_use]
    pub fn allocates_in(self, phase: NormalizationPhase) -> bool {
        self.allocation_phases().contains(&phase)
    }

    /// True if `execute_phase` accepts this kind in `phase`
    #[must_use]
    pub fn executes_in(self, phase: NormalizationPhase) -> bool {
        self.execution_phases().contains(&phase)
    }
}
