use std::collections::HashSet;

use crossbeam_skiplist::SkipMap;
use dashmap::{DashMap, DashSet};

use crate::{
    config::NormalizationOptions,
    metadata::{
        cilmodule::CilModule, diagnostics::DiagnosticSink, tables::RowContent, token::Token,
    },
    normalize::{
        dispatch,
        objects::{NormalizedGraph, NormalizedObject, NormalizedType, NormalizedTypeRef},
        types::{
            InstantiationSig, Interned, Interner, LocalsSig, MethodSig, PropertySig, TypeId,
            TypeSig,
        },
        NormalizationMode, NormalizationPhase, RawObject,
    },
    Error, Result,
};

/// State of one normalization run over one module
///
/// The context owns the normalized graph while it is being built: the arena of types, the mapping
/// from raw tokens to their counterparts and the interning tables. It also collects the unresolved
/// references tolerated in lenient phases until the driver calls
/// [`NormalizationContext::flush_errors`].
///
/// The driver moves the context through the phases with [`NormalizationContext::set_phase`]; every
/// phase-gated operation reads the phase from here.
pub struct NormalizationContext<'m> {
    module: &'m CilModule,
    options: NormalizationOptions,
    phase: NormalizationPhase,
    objects: SkipMap<Token, NormalizedObject>,
    in_progress: DashSet<Token>,
    types: boxcar::Vec<NormalizedType>,
    definitions_by_name: DashMap<String, TypeId>,
    nested_by_name: DashMap<(Token, String), TypeId>,
    external_types: DashMap<NormalizedTypeRef, TypeId>,
    type_sigs: Interner<TypeSig>,
    method_sigs: Interner<MethodSig>,
    locals_sigs: Interner<LocalsSig>,
    instantiation_sigs: Interner<InstantiationSig>,
    property_sigs: Interner<PropertySig>,
    errors: boxcar::Vec<Error>,
}

impl<'m> NormalizationContext<'m> {
    /// Start a run over `module` in the first phase
    #[must_use]
    pub fn new(module: &'m CilModule, options: NormalizationOptions) -> Self {
        NormalizationContext {
            module,
            options,
            phase: NormalizationPhase::CreationOfTypeDefinitions,
            objects: SkipMap::new(),
            in_progress: DashSet::new(),
            types: boxcar::Vec::new(),
            definitions_by_name: DashMap::new(),
            nested_by_name: DashMap::new(),
            external_types: DashMap::new(),
            type_sigs: Interner::new(),
            method_sigs: Interner::new(),
            locals_sigs: Interner::new(),
            instantiation_sigs: Interner::new(),
            property_sigs: Interner::new(),
            errors: boxcar::Vec::new(),
        }
    }

    /// The module being normalized
    #[must_use]
    pub fn module(&self) -> &'m CilModule {
        self.module
    }

    /// The options of this run
    #[must_use]
    pub fn options(&self) -> &NormalizationOptions {
        &self.options
    }

    /// The current phase
    #[must_use]
    pub fn phase(&self) -> NormalizationPhase {
        self.phase
    }

    /// Move to `phase`
    pub fn set_phase(&mut self, phase: NormalizationPhase) {
        tracing::debug!(
            module = self.module.name(),
            from = %self.phase,
            to = %phase,
            "normalization phase"
        );
        self.phase = phase;
    }

    /// Stop with [`Error::SilentAbort`] if the driver cancelled the run
    ///
    /// # Errors
    /// Returns [`Error::SilentAbort`] once the cancellation flag is raised
    pub fn check_cancelled(&self) -> Result<()> {
        match &self.options.cancellation {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }

    /// The counterpart of the raw object `token`, if it was normalized already
    #[must_use]
    pub fn normalized(&self, token: Token) -> Option<NormalizedObject> {
        self.objects.get(&token).map(|entry| entry.value().clone())
    }

    /// The counterpart of the raw object `token`, looked up or created according to `mode`
    ///
    /// `referrer` is the object holding the reference and is reported if the lookup fails.
    ///
    /// # Errors
    /// - [`Error::UnresolvedReference`] if `token` names no row, or `mode` forbids creating a
    ///   counterpart that does not exist yet
    /// - A malformed-format error if `mode` forbids returning an existing counterpart, or the
    ///   object depends on itself
    pub fn get_normalized(
        &self,
        token: Token,
        mode: NormalizationMode,
        referrer: Token,
    ) -> Result<NormalizedObject> {
        let Some(object) = RawObject::from_token(self.module, token) else {
            return Err(unresolved_error!(
                token,
                referrer,
                "No object {} in module {}",
                token,
                self.module.name()
            ));
        };
        self.normalize_raw(object, mode, referrer)
    }

    pub(crate) fn normalize_raw(
        &self,
        object: RawObject<'m>,
        mode: NormalizationMode,
        referrer: Token,
    ) -> Result<NormalizedObject> {
        let token = object.token();

        if let Some(entry) = self.objects.get(&token) {
            if mode.allows_lookup() {
                return Ok(entry.value().clone());
            }
            return Err(malformed_error!(
                "Detected recursive allocation attempt on {} {}",
                object.kind(),
                token
            ));
        }

        if !mode.allows_allocate() {
            return Err(unresolved_error!(
                token,
                referrer,
                "{} {} has not been normalized yet",
                object.kind(),
                token
            ));
        }

        if !self.in_progress.insert(token) {
            return Err(malformed_error!(
                "{} {} depends on itself",
                object.kind(),
                token
            ));
        }
        let built = dispatch::build(object, self);
        self.in_progress.remove(&token);

        let entry = self.objects.get_or_insert(token, built?);
        tracing::trace!(token = %token, kind = %object.kind(), "normalized");
        Ok(entry.value().clone())
    }

    /// Record an unresolved reference if the current phase tolerates it
    ///
    /// Returns `Ok(None)` for a recorded error. Errors of other kinds, and unresolved references
    /// outside of the tolerant phases, are returned unchanged.
    ///
    /// # Errors
    /// Returns `result`'s error unless it was recorded
    pub fn tolerate<T>(&self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_unresolved() && self.options.is_tolerant(self.phase) => {
                tracing::debug!(phase = %self.phase, %error, "unresolved reference recorded");
                self.errors.push(error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// The unresolved references recorded so far
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.errors.iter().map(|(_, error)| error)
    }

    /// Write every distinct recorded message to `sink` and abort if there was any
    ///
    /// The recorded errors are cleared.
    ///
    /// # Errors
    /// Returns [`Error::SilentAbort`] if at least one unresolved reference was recorded
    pub fn flush_errors(&mut self, sink: &dyn DiagnosticSink) -> Result<()> {
        let errors = std::mem::replace(&mut self.errors, boxcar::Vec::new());
        if errors.count() == 0 {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let messages: Vec<String> = errors
            .iter()
            .map(|(_, error)| error.to_string())
            .filter(|message| seen.insert(message.clone()))
            .collect();

        for message in &messages {
            sink.write_line(format_args!("{message}"));
        }
        sink.flush();

        tracing::warn!(
            module = self.module.name(),
            count = messages.len(),
            "normalization aborted on unresolved references"
        );
        Err(Error::SilentAbort(format!(
            "Failed to resolve {} external references",
            messages.len()
        )))
    }

    /// The canonical instance of a type
    pub fn make_unique_type(&self, draft: TypeSig) -> Interned<TypeSig> {
        self.type_sigs.make_unique(draft)
    }

    /// The canonical instance of a method signature
    pub fn make_unique_method(&self, draft: MethodSig) -> Interned<MethodSig> {
        self.method_sigs.make_unique(draft)
    }

    /// The canonical instance of a local-variable list
    pub fn make_unique_locals(&self, draft: LocalsSig) -> Interned<LocalsSig> {
        self.locals_sigs.make_unique(draft)
    }

    /// The canonical instance of a method instantiation
    pub fn make_unique_instantiation(&self, draft: InstantiationSig) -> Interned<InstantiationSig> {
        self.instantiation_sigs.make_unique(draft)
    }

    /// The canonical instance of a property signature
    pub fn make_unique_property(&self, draft: PropertySig) -> Interned<PropertySig> {
        self.property_sigs.make_unique(draft)
    }

    /// The type at `id`
    #[must_use]
    pub fn type_info(&self, id: TypeId) -> Option<&NormalizedType> {
        self.types.get(id.0)
    }

    /// Number of types in the arena
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.count()
    }

    /// The top-level type defined in this module under `full_name`
    #[must_use]
    pub fn definition_by_name(&self, full_name: &str) -> Option<TypeId> {
        self.definitions_by_name.get(full_name).map(|id| *id)
    }

    /// Finish the run and hand the graph to the driver
    #[must_use]
    pub fn into_graph(self) -> NormalizedGraph {
        NormalizedGraph {
            types: self.types,
            objects: self.objects,
        }
    }

    pub(crate) fn push_type(&self, ty: NormalizedType) -> TypeId {
        TypeId(self.types.push(ty))
    }

    /// Index a new definition; the first definition of a name wins
    pub(crate) fn register_definition(
        &self,
        enclosing: Option<Token>,
        name: &str,
        full_name: String,
        id: TypeId,
    ) {
        let inserted = match enclosing {
            Some(enclosing) => *self
                .nested_by_name
                .entry((enclosing, name.to_string()))
                .or_insert(id),
            None => *self.definitions_by_name.entry(full_name.clone()).or_insert(id),
        };

        if inserted != id {
            tracing::debug!(name = %full_name, "duplicate type definition name");
        }
    }

    pub(crate) fn nested_definition(&self, enclosing: Token, name: &str) -> Option<TypeId> {
        self.nested_by_name
            .get(&(enclosing, name.to_string()))
            .map(|id| *id)
    }

    /// The arena entry of an external type, created on first use
    pub(crate) fn external_type(&self, reference: NormalizedTypeRef) -> TypeId {
        if let Some(id) = self.external_types.get(&reference) {
            return *id;
        }

        *self
            .external_types
            .entry(reference.clone())
            .or_insert_with(|| self.push_type(NormalizedType::Reference(reference)))
    }

    /// The filled content of raw row `token` of `D`'s table
    pub(crate) fn raw<D: RowContent>(&self, token: Token, referrer: Token) -> Result<&'m D> {
        self.module
            .get::<D>(token)
            .ok_or_else(|| {
                unresolved_error!(token, referrer, "No {} row {}", D::TABLE, token.row())
            })?
            .content()
    }
}
