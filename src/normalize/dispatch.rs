//! Phase-gated entry points and the per-kind builders behind them.

use std::sync::{Arc, OnceLock};

use crate::{
    metadata::{
        tables::{
            AssemblyRef, ClassLayout, Field, FieldLayout, FieldMarshal, MemberRef,
            MemberRefSignature, MetadataObject, MethodDef, MethodSpec, ModuleRef, Param, Property,
            StandAloneSig, StandAloneSignature, TableId, TypeDef, TypeRef,
        },
        token::Token,
    },
    normalize::{
        objects::{
            MemberParent, MemberReference, MemberSig, NormalizedField, NormalizedMember,
            NormalizedMethod, NormalizedMethodSpec, NormalizedObject, NormalizedProperty,
            NormalizedStandAlone, NormalizedType, NormalizedTypeDef, NormalizedTypeRef,
            TypeLayout, TypeScope,
        },
        types::TypeId,
        NormalizationContext, NormalizationMode, NormalizationPhase, RawObject, RawObjectKind,
    },
    Error, Result,
};

/// Create the normalized counterpart of `object` in the context's current phase
///
/// Each [`crate::normalize::RawObjectKind`] is accepted only in its
/// [`allocation_phases`](crate::normalize::RawObjectKind::allocation_phases). A counterpart
/// created earlier, for example on first use from a signature, is returned as is. In a tolerant
/// phase an unresolved reference is recorded on the context and `None` is returned.
///
/// # Errors
/// - [`Error::InvalidPhase`] if the kind is not allocated in the current phase
/// - [`Error::UnresolvedReference`] for an unresolved reference outside of the tolerant phases
/// - A malformed-format error for inconsistent metadata
/// - [`Error::SilentAbort`] if the run was cancelled
pub fn allocate_normalized(
    object: RawObject<'_>,
    context: &NormalizationContext<'_>,
) -> Result<Option<NormalizedObject>> {
    context.check_cancelled()?;

    let kind = object.kind();
    let phase = context.phase();
    if !kind.allocates_in(phase) {
        return Err(Error::InvalidPhase { phase, kind });
    }

    let _span = tracing::trace_span!(
        "allocate_normalized",
        kind = %kind,
        token = %object.token()
    )
    .entered();

    let Some(object) = RawObject::from_token(context.module(), object.token()) else {
        return Err(unresolved_error!(
            object.token(),
            object.token(),
            "{} is not part of module {}",
            object.token(),
            context.module().name()
        ));
    };

    context.tolerate(context.normalize_raw(object, NormalizationMode::Default, object.token()))
}

/// Run the current phase's step on an already allocated counterpart
///
/// Type definitions link their base and enclosing types in
/// [`NormalizationPhase::CreationOfTypeHierarchy`], their layout in
/// [`NormalizationPhase::CompletionOfTypeNormalization`], and create their fields and methods in
/// [`NormalizationPhase::CreationOfFieldDefinitions`] and
/// [`NormalizationPhase::CreationOfMethodDefinitions`]. Method definitions receive their parameter
/// names in [`NormalizationPhase::CompletionOfMethodNormalization`].
///
/// # Errors
/// - [`Error::InvalidPhase`] if the kind has no step in the current phase
/// - A malformed-format error if `normalized` is not the counterpart of `object`, or the step
///   already ran
/// - [`Error::UnresolvedReference`] for an unresolved reference outside of the tolerant phases
/// - [`Error::SilentAbort`] if the run was cancelled
pub fn execute_phase(
    object: RawObject<'_>,
    normalized: &NormalizedObject,
    context: &NormalizationContext<'_>,
) -> Result<()> {
    context.check_cancelled()?;

    let kind = object.kind();
    let phase = context.phase();
    if !kind.executes_in(phase) {
        return Err(Error::InvalidPhase { phase, kind });
    }

    let _span =
        tracing::trace_span!("execute_phase", kind = %kind, token = %object.token(), phase = %phase)
            .entered();

    match (object, normalized) {
        (RawObject::TypeDef(raw), NormalizedObject::Type(id)) => {
            execute_type_def(raw, *id, context)
        }
        (RawObject::MethodDef(raw), NormalizedObject::Method(method)) => {
            execute_method_def(raw, method, context)
        }
        (object, normalized) => Err(malformed_error!(
            "A {} is not the counterpart of {:?}",
            normalized.describe(),
            object
        )),
    }
}

/// Build the counterpart of `object` without checking the phase
pub(crate) fn build(
    object: RawObject<'_>,
    context: &NormalizationContext<'_>,
) -> Result<NormalizedObject> {
    match object {
        RawObject::TypeDef(raw) => build_type_def(raw, context),
        RawObject::TypeRef(raw) => build_type_ref(raw, context),
        RawObject::TypeSpec(raw) => {
            let content = raw.content()?;
            let constructed = context.normalize_type(&content.signature.base, raw.token())?;
            Ok(NormalizedObject::Constructed(constructed))
        }
        RawObject::Field(raw) => build_field(raw, context).map(NormalizedObject::Field),
        RawObject::MethodDef(raw) => build_method_def(raw, context).map(NormalizedObject::Method),
        RawObject::MemberRef(raw) => build_member_ref(raw, context).map(NormalizedObject::Member),
        RawObject::MethodSpec(raw) => {
            build_method_spec(raw, context).map(NormalizedObject::MethodSpec)
        }
        RawObject::StandAloneSig(raw) => {
            build_stand_alone(raw, context).map(NormalizedObject::StandAlone)
        }
        RawObject::Property(raw) => build_property(raw, context).map(NormalizedObject::Property),
        other => Err(malformed_error!(
            "{} {} has no normalized counterpart",
            other.kind(),
            other.token()
        )),
    }
}

fn build_type_def(
    raw: &MetadataObject<TypeDef>,
    context: &NormalizationContext<'_>,
) -> Result<NormalizedObject> {
    let content = raw.content()?;
    let definition = NormalizedTypeDef::new(
        raw.token(),
        content.name.clone(),
        content.namespace.clone(),
        content.flags,
    );
    let full_name = definition.full_name();

    let id = context.push_type(NormalizedType::Definition(definition));
    context.register_definition(raw.enclosing_type(), &content.name, full_name, id);
    Ok(NormalizedObject::Type(id))
}

fn build_type_ref(
    raw: &MetadataObject<TypeRef>,
    context: &NormalizationContext<'_>,
) -> Result<NormalizedObject> {
    let token = raw.token();
    let content = raw.content()?;

    let scope = match content.resolution_scope {
        None => None,
        Some(scope) => match scope.table_id() {
            Some(TableId::Module) => None,
            Some(TableId::ModuleRef) => Some(TypeScope::Module(
                context.raw::<ModuleRef>(scope, token)?.name.clone(),
            )),
            Some(TableId::AssemblyRef) => Some(TypeScope::Assembly(
                context.raw::<AssemblyRef>(scope, token)?.to_string(),
            )),
            Some(TableId::TypeRef) => {
                let enclosing = context.get_normalized(scope, NormalizationMode::Default, token)?;
                let enclosing = match enclosing {
                    NormalizedObject::Type(id) => id,
                    other => {
                        return Err(malformed_error!(
                            "Resolution scope {} of {} normalized to a {}",
                            scope,
                            token,
                            other.describe()
                        ))
                    }
                };

                match context.type_info(enclosing) {
                    Some(NormalizedType::Definition(outer)) => {
                        return context
                            .nested_definition(outer.token, &content.name)
                            .map(NormalizedObject::Type)
                            .ok_or_else(|| {
                                unresolved_error!(
                                    token,
                                    token,
                                    "Type {} is not nested in {}",
                                    content.name,
                                    outer.full_name()
                                )
                            });
                    }
                    _ => Some(TypeScope::Nested(enclosing)),
                }
            }
            _ => {
                return Err(malformed_error!(
                    "Resolution scope {} of {} is not a scope",
                    scope,
                    token
                ))
            }
        },
    };

    let Some(scope) = scope else {
        let full_name = content.full_name();
        return context
            .definition_by_name(&full_name)
            .map(NormalizedObject::Type)
            .ok_or_else(|| {
                unresolved_error!(
                    token,
                    token,
                    "Type {} is not defined in module {}",
                    full_name,
                    context.module().name()
                )
            });
    };

    let id = context.external_type(NormalizedTypeRef {
        scope,
        namespace: content.namespace.clone(),
        name: content.name.clone(),
    });
    Ok(NormalizedObject::Type(id))
}

/// The declaring type of a member, `None` when ownership links were not computed
fn owner_type(
    owner: Option<Token>,
    member: Token,
    context: &NormalizationContext<'_>,
) -> Result<Option<TypeId>> {
    let Some(owner) = owner else {
        return Ok(None);
    };

    match context.get_normalized(owner, NormalizationMode::LookupExisting, member)? {
        NormalizedObject::Type(id) => Ok(Some(id)),
        other => Err(malformed_error!(
            "Owner {} of {} normalized to a {}",
            owner,
            member,
            other.describe()
        )),
    }
}

fn build_field(
    raw: &MetadataObject<Field>,
    context: &NormalizationContext<'_>,
) -> Result<Arc<NormalizedField>> {
    let token = raw.token();
    let content = raw.content()?;

    let offset = match raw.layout() {
        Some(layout) => Some(context.raw::<FieldLayout>(layout, token)?.field_offset),
        None => None,
    };
    let marshal = match raw.marshal() {
        Some(marshal) => Some(context.raw::<FieldMarshal>(marshal, token)?.native_type.clone()),
        None => None,
    };

    Ok(Arc::new(NormalizedField {
        token,
        name: content.name.clone(),
        flags: content.flags,
        field_type: context.normalize_type(&content.signature.base, token)?,
        owner: owner_type(raw.owner(), token, context)?,
        offset,
        marshal,
    }))
}

fn build_method_def(
    raw: &MetadataObject<MethodDef>,
    context: &NormalizationContext<'_>,
) -> Result<Arc<NormalizedMethod>> {
    let token = raw.token();
    let content = raw.content()?;

    Ok(Arc::new(NormalizedMethod {
        token,
        name: content.name.clone(),
        flags: content.flags,
        impl_flags: content.impl_flags,
        rva: content.rva,
        signature: context.normalize_method_signature(&content.signature, token)?,
        owner: owner_type(raw.owner(), token, context)?,
        param_names: OnceLock::new(),
    }))
}

enum MemberLookup {
    Found(NormalizedMember),
    /// The chain left the module before a match was found
    Inherited,
    Missing,
}

/// Search `start` and its local base types for a member with `name` and `signature`
fn find_local_member(
    start: TypeId,
    name: &str,
    signature: &MemberSig,
    context: &NormalizationContext<'_>,
) -> MemberLookup {
    let mut current = start;

    // A base chain can not be longer than the arena unless it loops
    for _ in 0..=context.type_count() {
        let Some(NormalizedType::Definition(definition)) = context.type_info(current) else {
            return MemberLookup::Inherited;
        };

        let found = match signature {
            MemberSig::Field(field_type) => definition
                .fields()
                .iter()
                .find(|field| field.name == name && field.field_type == *field_type)
                .cloned()
                .map(NormalizedMember::Field),
            MemberSig::Method(method_sig) => definition
                .methods()
                .iter()
                .find(|method| method.name == name && method.signature == *method_sig)
                .cloned()
                .map(NormalizedMember::Method),
        };
        if let Some(found) = found {
            return MemberLookup::Found(found);
        }

        match definition.extends() {
            None => return MemberLookup::Missing,
            Some(base) => match base.type_id() {
                Some(next) => current = next,
                None => return MemberLookup::Inherited,
            },
        }
    }

    MemberLookup::Missing
}

fn build_member_ref(
    raw: &MetadataObject<MemberRef>,
    context: &NormalizationContext<'_>,
) -> Result<NormalizedMember> {
    let token = raw.token();
    let content = raw.content()?;
    let class = content.class;

    let signature = match &content.signature {
        MemberRefSignature::Method(method) => {
            MemberSig::Method(context.normalize_method_signature(method, token)?)
        }
        MemberRefSignature::Field(field) => {
            MemberSig::Field(context.normalize_type(&field.base, token)?)
        }
    };

    let parent = match class.table_id() {
        Some(TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec) => {
            let parent_type = context.type_reference(class, false, token)?;
            let local = parent_type.type_id().filter(|id| {
                matches!(context.type_info(*id), Some(NormalizedType::Definition(_)))
            });

            if let Some(id) = local {
                match find_local_member(id, &content.name, &signature, context) {
                    MemberLookup::Found(member) => return Ok(member),
                    MemberLookup::Inherited => {}
                    MemberLookup::Missing => {
                        return Err(unresolved_error!(
                            token,
                            class,
                            "{} has no member {} with a matching signature",
                            type_name(id, context),
                            content.name
                        ))
                    }
                }
            }
            MemberParent::Type(parent_type)
        }
        Some(TableId::ModuleRef) => {
            MemberParent::Module(context.raw::<ModuleRef>(class, token)?.name.clone())
        }
        Some(TableId::MethodDef) => {
            match context.get_normalized(class, NormalizationMode::Default, token)? {
                NormalizedObject::Method(method) => MemberParent::Method(method),
                other => {
                    return Err(malformed_error!(
                        "Parent {} of {} normalized to a {}",
                        class,
                        token,
                        other.describe()
                    ))
                }
            }
        }
        _ => {
            return Err(malformed_error!(
                "Parent {} of {} can not own members",
                class,
                token
            ))
        }
    };

    Ok(NormalizedMember::Reference(Arc::new(MemberReference {
        token,
        parent,
        name: content.name.clone(),
        signature,
    })))
}

fn build_method_spec(
    raw: &MetadataObject<MethodSpec>,
    context: &NormalizationContext<'_>,
) -> Result<Arc<NormalizedMethodSpec>> {
    let token = raw.token();
    let content = raw.content()?;

    let method = match context.get_normalized(content.method, NormalizationMode::Default, token)? {
        NormalizedObject::Method(method) => NormalizedMember::Method(method),
        NormalizedObject::Member(member) => member,
        other => {
            return Err(malformed_error!(
                "Generic method {} of {} normalized to a {}",
                content.method,
                token,
                other.describe()
            ))
        }
    };

    Ok(Arc::new(NormalizedMethodSpec {
        token,
        method,
        instantiation: context.normalize_method_spec_signature(&content.instantiation, token)?,
    }))
}

fn build_stand_alone(
    raw: &MetadataObject<StandAloneSig>,
    context: &NormalizationContext<'_>,
) -> Result<NormalizedStandAlone> {
    let token = raw.token();
    match &raw.content()?.signature {
        StandAloneSignature::LocalVariables(locals) => Ok(NormalizedStandAlone::Locals(
            context.normalize_locals_signature(locals, token)?,
        )),
        StandAloneSignature::Method(method) => Ok(NormalizedStandAlone::Method(
            context.normalize_method_signature(method, token)?,
        )),
    }
}

fn build_property(
    raw: &MetadataObject<Property>,
    context: &NormalizationContext<'_>,
) -> Result<Arc<NormalizedProperty>> {
    let token = raw.token();
    let content = raw.content()?;

    Ok(Arc::new(NormalizedProperty {
        token,
        name: content.name.clone(),
        flags: content.flags,
        signature: context.normalize_property_signature(&content.signature, token)?,
    }))
}

fn set_once<T>(
    cell: &OnceLock<T>,
    value: T,
    phase: NormalizationPhase,
    token: Token,
) -> Result<()> {
    cell.set(value)
        .map_err(|_| malformed_error!("Phase {} ran twice on {}", phase, token))
}

fn type_name(id: TypeId, context: &NormalizationContext<'_>) -> String {
    context
        .type_info(id)
        .map_or_else(|| id.to_string(), NormalizedType::full_name)
}

fn execute_type_def(
    raw: &MetadataObject<TypeDef>,
    id: TypeId,
    context: &NormalizationContext<'_>,
) -> Result<()> {
    let token = raw.token();
    let phase = context.phase();
    let Some(NormalizedType::Definition(definition)) = context.type_info(id) else {
        return Err(malformed_error!("{} is not the definition of {}", id, token));
    };
    if definition.token != token {
        return Err(malformed_error!(
            "{} belongs to {}, not to {}",
            id,
            definition.token,
            token
        ));
    }
    let content = raw.content()?;

    match phase {
        NormalizationPhase::CreationOfTypeHierarchy => {
            let extends = match content.extends {
                Some(base) => context.tolerate(context.type_reference(base, false, token))?,
                None => None,
            };
            let value_type = extends
                .as_ref()
                .and_then(|base| base.type_id())
                .is_some_and(|base| {
                    let base_name = type_name(base, context);
                    (base_name == "System.ValueType" || base_name == "System.Enum")
                        && definition.full_name() != "System.Enum"
                });

            let enclosing = match raw.enclosing_type() {
                Some(outer) => {
                    match context.get_normalized(outer, NormalizationMode::LookupExisting, token)? {
                        NormalizedObject::Type(outer) => Some(outer),
                        other => {
                            return Err(malformed_error!(
                                "Enclosing type {} of {} normalized to a {}",
                                outer,
                                token,
                                other.describe()
                            ))
                        }
                    }
                }
                None => None,
            };

            set_once(&definition.extends, extends, phase, token)?;
            set_once(&definition.value_type, value_type, phase, token)?;
            set_once(&definition.enclosing, enclosing, phase, token)
        }
        NormalizationPhase::CompletionOfTypeNormalization => {
            let layout = match raw.class_layout() {
                Some(layout) => {
                    let layout = context.raw::<ClassLayout>(layout, token)?;
                    Some(TypeLayout {
                        packing_size: layout.packing_size,
                        class_size: layout.class_size,
                    })
                }
                None => None,
            };
            set_once(&definition.layout, layout, phase, token)
        }
        NormalizationPhase::CreationOfFieldDefinitions => {
            let mut fields = Vec::with_capacity(content.fields.len());
            for field in content.field_tokens() {
                match context.get_normalized(field, NormalizationMode::Default, token)? {
                    NormalizedObject::Field(field) => fields.push(field),
                    other => {
                        return Err(malformed_error!(
                            "Field {} of {} normalized to a {}",
                            field,
                            token,
                            other.describe()
                        ))
                    }
                }
            }
            set_once(&definition.fields, fields, phase, token)
        }
        NormalizationPhase::CreationOfMethodDefinitions => {
            let mut methods = Vec::with_capacity(content.methods.len());
            for method in content.method_tokens() {
                match context.get_normalized(method, NormalizationMode::Default, token)? {
                    NormalizedObject::Method(method) => methods.push(method),
                    other => {
                        return Err(malformed_error!(
                            "Method {} of {} normalized to a {}",
                            method,
                            token,
                            other.describe()
                        ))
                    }
                }
            }
            set_once(&definition.methods, methods, phase, token)
        }
        _ => Err(Error::InvalidPhase {
            phase,
            kind: RawObjectKind::TypeDef,
        }),
    }
}

fn execute_method_def(
    raw: &MetadataObject<MethodDef>,
    method: &NormalizedMethod,
    context: &NormalizationContext<'_>,
) -> Result<()> {
    let token = raw.token();
    if method.token != token {
        return Err(malformed_error!(
            "Method {} is not the counterpart of {}",
            method.token,
            token
        ));
    }

    let content = raw.content()?;
    let mut names = vec![None; method.signature.params.len() + 1];
    for param in content.param_tokens() {
        let param = context.raw::<Param>(param, token)?;
        let Some(slot) = names.get_mut(param.sequence as usize) else {
            return Err(malformed_error!(
                "Parameter {} of {} is past its {} parameters",
                param.sequence,
                token,
                method.signature.params.len()
            ));
        };
        if !param.name.is_empty() {
            *slot = Some(param.name.clone());
        }
    }

    set_once(&method.param_names, names, context.phase(), token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            cilmodule::CilModule, diagnostics::WriterSink, signatures::CallingConvention,
            tables::TypeSpec,
        },
        normalize::types::{Interned, PrimitiveType, TypeSig},
        test::builder::{sig, MetadataBuilder},
        NormalizationOptions,
    };
    use strum::IntoEnumIterator;

    fn sample_module() -> CilModule {
        let mut builder = MetadataBuilder::new();
        let system = builder.assembly_ref("System.Runtime");
        let object = builder.type_ref(system, "System", "Object");
        let value_type = builder.type_ref(system, "System", "ValueType");

        let point = builder.type_def("Geometry", "Point", Some(value_type));
        builder.field("X", &sig::field(&[sig::I4]));
        builder.field("Y", &sig::field(&[sig::I4]));
        builder.field_layout(1, 4);

        let shape = builder.type_def("Geometry", "Shape", Some(object));
        let area = builder.method("Area", &sig::method(0x20, &[sig::R8], &[]));
        builder.param(0, "");
        let _ = area;
        let mv = builder.method(
            "Move",
            &sig::method(0x20, &[sig::VOID], &[sig::value_type(point), vec![sig::I4]]),
        );
        builder.param(1, "to");
        builder.param(2, "steps");
        let _ = (shape, mv);

        builder.member_ref(shape, "Area", &sig::method(0x20, &[sig::R8], &[]));
        builder.member_ref(object, "ToString", &sig::method(0x20, &[sig::STRING], &[]));
        builder.method_spec(mv, &sig::method_spec(&[vec![sig::I4], vec![sig::STRING]]));
        builder.type_spec(&sig::sz_array(&[sig::I4]));

        builder.build_module()
    }

    fn run_until(
        context: &mut NormalizationContext<'_>,
        module: &CilModule,
        last: NormalizationPhase,
    ) {
        for phase in NormalizationPhase::iter().take_while(|phase| *phase <= last) {
            context.set_phase(phase);
            for kind in RawObjectKind::iter().filter(|kind| kind.allocates_in(phase)) {
                for object in RawObject::all_of(module, kind) {
                    allocate_normalized(object, context).unwrap();
                }
            }
            for kind in RawObjectKind::iter().filter(|kind| kind.executes_in(phase)) {
                for object in RawObject::all_of(module, kind) {
                    if let Some(normalized) = context.normalized(object.token()) {
                        execute_phase(object, &normalized, context).unwrap();
                    }
                }
            }
        }
    }

    #[test]
    fn allocation_outside_declared_phases_fails() {
        let module = sample_module();
        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());

        for phase in NormalizationPhase::iter() {
            context.set_phase(phase);
            for kind in RawObjectKind::iter().filter(|kind| !kind.allocates_in(phase)) {
                let table = module.info().rows(kind.table());
                let Some(object) = RawObject::all_of(&module, kind).next() else {
                    assert_eq!(table, 0);
                    continue;
                };
                match allocate_normalized(object, &context) {
                    Err(Error::InvalidPhase {
                        phase: got_phase,
                        kind: got_kind,
                    }) => {
                        assert_eq!(got_phase, phase);
                        assert_eq!(got_kind, kind);
                    }
                    other => panic!("{kind} in {phase}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn execution_outside_declared_phases_fails() {
        let module = sample_module();
        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        let type_def = RawObject::all_of(&module, RawObjectKind::TypeDef).next().unwrap();
        let normalized = allocate_normalized(type_def, &context).unwrap().unwrap();

        for phase in [
            NormalizationPhase::CreationOfTypeDefinitions,
            NormalizationPhase::ResolutionOfTypeReferences,
            NormalizationPhase::CompletionOfMethodNormalization,
        ] {
            context.set_phase(phase);
            assert!(matches!(
                execute_phase(type_def, &normalized, &context),
                Err(Error::InvalidPhase { .. })
            ));
        }
    }

    #[test]
    fn full_run_builds_graph() {
        let module = sample_module();
        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(
            &mut context,
            &module,
            NormalizationPhase::CompletionOfMethodNormalization,
        );
        context
            .flush_errors(&WriterSink::new(Vec::new()))
            .unwrap();

        let point_id = context.definition_by_name("Geometry.Point").unwrap();
        let point = context.type_info(point_id).unwrap().as_definition().unwrap();
        assert!(point.is_value_type());
        assert_eq!(point.fields().len(), 2);
        assert_eq!(point.fields()[0].offset, Some(4));
        assert_eq!(point.fields()[1].offset, None);
        assert_eq!(point.fields()[0].owner, Some(point_id));
        assert!(Interned::ptr_eq(
            &point.fields()[0].field_type,
            &point.fields()[1].field_type
        ));

        let shape_id = context.definition_by_name("Geometry.Shape").unwrap();
        let shape = context.type_info(shape_id).unwrap().as_definition().unwrap();
        assert!(!shape.is_value_type());
        assert_eq!(shape.methods().len(), 2);
        let mv = &shape.methods()[1];
        assert_eq!(mv.param_name(1), Some("to"));
        assert_eq!(mv.param_name(2), Some("steps"));
        assert_eq!(
            *mv.signature.params[0],
            TypeSig::ValueType(point_id)
        );

        let area_ref = context.normalized(Token::new(0x0A00_0001)).unwrap();
        match area_ref {
            NormalizedObject::Member(NormalizedMember::Method(method)) => {
                assert!(Arc::ptr_eq(&method, &shape.methods()[0]));
            }
            other => panic!("{other:?}"),
        }

        match context.normalized(Token::new(0x0A00_0002)).unwrap() {
            NormalizedObject::Member(NormalizedMember::Reference(reference)) => {
                assert_eq!(reference.name, "ToString");
                assert!(matches!(reference.parent, MemberParent::Type(_)));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn side_tables_and_constructed_types() {
        let mut builder = MetadataBuilder::new();
        let runtime = builder.assembly_ref("System.Runtime");
        let object = builder.type_ref(runtime, "System", "Object");
        let list = builder.type_ref(runtime, "System.Collections.Generic", "List`1");
        let volatile =
            builder.type_ref(runtime, "System.Runtime.CompilerServices", "IsVolatile");

        let outer = builder.type_def("Store", "Outer", Some(object));
        let counter = sig::modified(true, volatile, &[sig::I4]);
        builder.field("counter", &sig::field(&counter));
        let names = sig::generic_inst(list, &[vec![sig::STRING]]);
        builder.field("names", &sig::field(&names));
        builder.field("raw", &sig::field(&sig::ptr(&[sig::U1])));
        builder.method(
            "Swap",
            &sig::generic_method(1, &[sig::VOID], &[sig::by_ref(&[sig::MVAR, 0])]),
        );
        builder.param(1, "value");
        let inner = builder.type_def("", "Inner", Some(object));
        builder.nested_class(inner, outer);

        let locals = builder.stand_alone_sig(&sig::locals(&[
            vec![sig::I4],
            sig::sz_array(&[sig::STRING]),
        ]));
        let count = builder.property("Count", &sig::property(true, &[sig::I4], &[]));
        let module = builder.build_module();

        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(
            &mut context,
            &module,
            NormalizationPhase::CompletionOfMethodNormalization,
        );
        context
            .flush_errors(&WriterSink::new(Vec::new()))
            .unwrap();

        let outer_id = context.definition_by_name("Store.Outer").unwrap();
        let outer = context.type_info(outer_id).unwrap().as_definition().unwrap();
        let Some(NormalizedObject::Type(inner_id)) = context.normalized(inner) else {
            panic!("Inner was not normalized");
        };
        let inner = context.type_info(inner_id).unwrap().as_definition().unwrap();
        assert_eq!(inner.enclosing(), Some(outer_id));
        assert_eq!(outer.enclosing(), None);

        let fields = outer.fields();
        match &*fields[0].field_type {
            TypeSig::Modified { modifiers, inner } => {
                assert_eq!(modifiers.len(), 1);
                assert!(modifiers[0].is_required);
                let modifier = modifiers[0].modifier.type_id().unwrap();
                assert_eq!(
                    context.type_info(modifier).unwrap().full_name(),
                    "System.Runtime.CompilerServices.IsVolatile"
                );
                assert_eq!(**inner, TypeSig::Primitive(PrimitiveType::I4));
            }
            other => panic!("{other:?}"),
        }
        match &*fields[1].field_type {
            TypeSig::GenericInstance { base, args } => {
                let base = base.type_id().unwrap();
                assert_eq!(
                    context.type_info(base).unwrap().full_name(),
                    "System.Collections.Generic.List`1"
                );
                assert_eq!(*args[0], TypeSig::Primitive(PrimitiveType::String));
            }
            other => panic!("{other:?}"),
        }
        assert!(matches!(&*fields[2].field_type, TypeSig::Pointer(_)));

        let swap = &outer.methods()[0];
        assert_eq!(swap.param_name(1), Some("value"));
        match &*swap.signature.params[0] {
            TypeSig::ByRef(target) => assert_eq!(**target, TypeSig::MethodGenericParam(0)),
            other => panic!("{other:?}"),
        }

        match context.normalized(locals).unwrap() {
            NormalizedObject::StandAlone(NormalizedStandAlone::Locals(locals)) => {
                assert_eq!(locals.locals.len(), 2);
                assert!(matches!(&*locals.locals[1], TypeSig::SzArray(_)));
            }
            other => panic!("{other:?}"),
        }
        match context.normalized(count).unwrap() {
            NormalizedObject::Property(property) => {
                assert_eq!(property.name, "Count");
                assert!(property.signature.has_this);
                assert_eq!(
                    *property.signature.property_type,
                    TypeSig::Primitive(PrimitiveType::I4)
                );
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn method_spec_uses_default_calling_convention() {
        let module = sample_module();
        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(
            &mut context,
            &module,
            NormalizationPhase::CompletionOfMethodNormalization,
        );

        match context.normalized(Token::new(0x2B00_0001)).unwrap() {
            NormalizedObject::MethodSpec(spec) => {
                assert_eq!(spec.instantiation.calling_convention, CallingConvention::DEFAULT);
                assert_eq!(spec.instantiation.calling_convention.bits(), 0);
                assert_eq!(spec.instantiation.args.len(), 2);
                assert_eq!(
                    *spec.instantiation.args[1],
                    TypeSig::Primitive(PrimitiveType::String)
                );
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn same_raw_signature_interns_once() {
        let module = sample_module();
        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(&mut context, &module, NormalizationPhase::ResolutionOfTypeReferences);

        let type_spec = module.get::<TypeSpec>(Token::new(0x1B00_0001)).unwrap();
        let raw = &type_spec.content().unwrap().signature.base;
        let first = context.normalize_type(raw, type_spec.token()).unwrap();
        let second = context.normalize_type(raw, type_spec.token()).unwrap();
        assert!(Interned::ptr_eq(&first, &second));

        match context.normalized(type_spec.token()).unwrap() {
            NormalizedObject::Constructed(constructed) => {
                assert!(Interned::ptr_eq(&constructed, &first));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn lookup_existing_requires_prior_allocation() {
        let module = sample_module();
        let context = NormalizationContext::new(&module, NormalizationOptions::default());

        let error = context
            .get_normalized(
                Token::new(0x0200_0001),
                NormalizationMode::LookupExisting,
                Token::new(0x0400_0001),
            )
            .unwrap_err();
        match error {
            Error::UnresolvedReference {
                target, referrer, ..
            } => {
                assert_eq!(target, Token::new(0x0200_0001));
                assert_eq!(referrer, Token::new(0x0400_0001));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn allocate_mode_rejects_existing() {
        let module = sample_module();
        let context = NormalizationContext::new(&module, NormalizationOptions::default());
        let type_def = RawObject::all_of(&module, RawObjectKind::TypeDef).next().unwrap();
        allocate_normalized(type_def, &context).unwrap();

        let error = context
            .get_normalized(type_def.token(), NormalizationMode::Allocate, type_def.token())
            .unwrap_err();
        assert!(error.is_malformed());
    }

    #[test]
    fn unresolved_member_is_tolerated_then_flushed() {
        let mut builder = MetadataBuilder::new();
        let widget = builder.type_def("Ui", "Widget", None);
        builder.member_ref(widget, "Missing", &sig::method(0x20, &[sig::VOID], &[]));
        let module = builder.build_module();

        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(
            &mut context,
            &module,
            NormalizationPhase::CompletionOfMethodNormalization,
        );
        assert!(context.normalized(Token::new(0x0A00_0001)).is_none());

        let sink = WriterSink::new(Vec::new());
        let error = context.flush_errors(&sink).unwrap_err();
        assert!(error.is_silent_abort());
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("Missing"));
    }

    #[test]
    fn unresolved_local_type_ref_is_tolerated() {
        let mut builder = MetadataBuilder::new();
        builder.type_def("App", "Main", None);
        builder.type_ref_in_module("App", "Gone");
        let module = builder.build_module();

        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(&mut context, &module, NormalizationPhase::ResolutionOfTypeReferences);
        assert_eq!(context.errors().count(), 1);

        let mut strict = NormalizationContext::new(&module, NormalizationOptions::strict());
        strict.set_phase(NormalizationPhase::CreationOfTypeDefinitions);
        for object in RawObject::all_of(&module, RawObjectKind::TypeDef) {
            allocate_normalized(object, &strict).unwrap();
        }
        strict.set_phase(NormalizationPhase::ResolutionOfTypeReferences);
        let type_ref = RawObject::all_of(&module, RawObjectKind::TypeRef).next().unwrap();
        assert!(allocate_normalized(type_ref, &strict).unwrap_err().is_unresolved());
    }

    #[test]
    fn external_type_refs_share_one_type() {
        let mut builder = MetadataBuilder::new();
        let runtime = builder.assembly_ref("System.Runtime");
        builder.type_ref(runtime, "System", "String");
        builder.type_ref(runtime, "System", "String");
        let module = builder.build_module();

        let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
        run_until(&mut context, &module, NormalizationPhase::ResolutionOfTypeReferences);

        let first = context.normalized(Token::new(0x0100_0001)).unwrap();
        let second = context.normalized(Token::new(0x0100_0002)).unwrap();
        match (first, second) {
            (NormalizedObject::Type(a), NormalizedObject::Type(b)) => {
                assert_eq!(a, b);
                assert_eq!(context.type_info(a).unwrap().full_name(), "System.String");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn cancellation_aborts_silently() {
        let module = sample_module();
        let flag = crate::CancellationFlag::new();
        let context = NormalizationContext::new(
            &module,
            NormalizationOptions::default().with_cancellation(flag.clone()),
        );
        flag.cancel();

        let type_def = RawObject::all_of(&module, RawObjectKind::TypeDef).next().unwrap();
        assert!(allocate_normalized(type_def, &context)
            .unwrap_err()
            .is_silent_abort());
    }
}
