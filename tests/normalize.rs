//! Integration tests for normalizing imported modules.

mod common;

use cilnorm::{
    metadata::{
        cilmodule::CilModule,
        diagnostics::WriterSink,
        tables::TableId,
        token::Token,
    },
    normalize::{
        allocate_normalized, normalize_module,
        objects::{MemberParent, NormalizedMember, NormalizedType},
        types::{Interned, PrimitiveType, TypeSig},
        NormalizationContext, NormalizationPhase, NormalizedObject, RawObject, RawObjectKind,
    },
    Error, ImportOptions, NormalizationOptions, Result,
};
use common::{init_tracing, named_type, Image};
use strum::IntoEnumIterator;

const VALUETYPE: u8 = 0x11;
const CLASS: u8 = 0x12;

struct Fixture {
    image: Image,
    object: Token,
    vector: Token,
    particle: Token,
}

fn physics() -> Fixture {
    let mut image = Image::new("Physics.dll");
    let runtime = {
        let name = image.string("System.Runtime");
        image.row(TableId::AssemblyRef, &[8, 0, 0, 0, 0, 0, name, 0, 0])
    };
    let object = image.type_ref(runtime, "System", "Object");
    let value_type = image.type_ref(runtime, "System", "ValueType");

    let vector = image.type_def("Physics", "Vector", Some(value_type));
    image.field("X", &[0x06, 0x0D]);
    image.field("Y", &[0x06, 0x0D]);
    // double Length()
    image.method("Length", &[0x20, 0x00, 0x0D]);

    let particle = image.type_def("Physics", "Particle", Some(object));
    image.field(
        "position",
        &[vec![0x06], named_type(VALUETYPE, vector)].concat(),
    );
    image.field("mass", &[0x06, 0x0D]);
    // void Push(Vector force, double seconds)
    image.method(
        "Push",
        &[
            vec![0x20, 0x02, 0x01],
            named_type(VALUETYPE, vector),
            vec![0x0D],
        ]
        .concat(),
    );
    image.param(1, "force");
    image.param(2, "seconds");

    Fixture {
        image,
        object,
        vector,
        particle,
    }
}

fn import(image: &Image) -> CilModule {
    CilModule::from_metadata("Physics", &image.build(), &ImportOptions::default()).unwrap()
}

#[test]
fn test_normalize_physics() -> Result<()> {
    init_tracing();
    let mut fixture = physics();
    let to_string = fixture
        .image
        .member_ref(fixture.object, "ToString", &[0x20, 0x00, 0x0E]);
    let length = fixture
        .image
        .member_ref(fixture.vector, "Length", &[0x20, 0x00, 0x0D]);
    let module = import(&fixture.image);

    let sink = WriterSink::new(Vec::new());
    let graph = normalize_module(&module, NormalizationOptions::default(), &sink)?;
    assert!(sink.into_inner().is_empty());

    let Some(NormalizedObject::Type(vector)) = graph.get(fixture.vector) else {
        panic!("Vector was not normalized");
    };
    let vector = graph.type_info(vector).unwrap().as_definition().unwrap();
    assert_eq!(vector.full_name(), "Physics.Vector");
    assert!(vector.is_value_type());
    assert_eq!(vector.fields().len(), 2);
    assert_eq!(vector.methods().len(), 1);

    let Some(NormalizedObject::Type(particle)) = graph.get(fixture.particle) else {
        panic!("Particle was not normalized");
    };
    let particle = graph.type_info(particle).unwrap().as_definition().unwrap();
    assert!(!particle.is_value_type());
    let push = &particle.methods()[0];
    assert_eq!(push.param_name(1), Some("force"));
    assert_eq!(push.param_name(2), Some("seconds"));

    let base = particle.extends().unwrap().type_id().unwrap();
    match graph.type_info(base) {
        Some(NormalizedType::Reference(reference)) => {
            assert_eq!(reference.full_name(), "System.Object");
        }
        other => panic!("unexpected base {other:?}"),
    }

    match graph.get(to_string) {
        Some(NormalizedObject::Member(NormalizedMember::Reference(reference))) => {
            assert_eq!(reference.name, "ToString");
            assert!(matches!(reference.parent, MemberParent::Type(_)));
        }
        other => panic!("unexpected ToString {other:?}"),
    }

    match graph.get(length) {
        Some(NormalizedObject::Member(NormalizedMember::Method(method))) => {
            assert!(std::sync::Arc::ptr_eq(&method, &vector.methods()[0]));
        }
        other => panic!("unexpected Length {other:?}"),
    }
    Ok(())
}

#[test]
fn test_equal_signatures_share_one_instance() -> Result<()> {
    let fixture = physics();
    let module = import(&fixture.image);
    let graph = normalize_module(
        &module,
        NormalizationOptions::default(),
        &WriterSink::new(std::io::sink()),
    )?;

    let field_type = |rid: u32| -> Interned<TypeSig> {
        match graph.get(Token::from_parts(TableId::Field, rid)) {
            Some(NormalizedObject::Field(field)) => field.field_type.clone(),
            other => panic!("field {rid} normalized to {other:?}"),
        }
    };

    let x = field_type(1);
    let y = field_type(2);
    let position = field_type(3);
    let mass = field_type(4);

    assert_eq!(*x, TypeSig::Primitive(PrimitiveType::R8));
    assert!(Interned::ptr_eq(&x, &y));
    assert!(Interned::ptr_eq(&x, &mass));
    assert!(!Interned::ptr_eq(&x, &position));

    let Some(NormalizedObject::Method(push)) = graph.get(Token::from_parts(TableId::MethodDef, 2))
    else {
        panic!("Push was not normalized");
    };
    assert!(Interned::ptr_eq(&push.signature.params[0], &position));
    assert!(Interned::ptr_eq(&push.signature.params[1], &mass));
    Ok(())
}

#[test]
fn test_phase_gating_for_every_present_kind() {
    let fixture = physics();
    let module = import(&fixture.image);

    for kind in RawObjectKind::iter() {
        let Some(object) = RawObject::all_of(&module, kind).next() else {
            continue;
        };

        for phase in NormalizationPhase::iter() {
            let mut context = NormalizationContext::new(&module, NormalizationOptions::default());
            context.set_phase(phase);

            let result = allocate_normalized(object, &context);
            let rejected = matches!(result, Err(Error::InvalidPhase { .. }));
            assert_eq!(rejected, !kind.allocates_in(phase), "{kind} in {phase}");
        }
    }
}

#[test]
fn test_unresolved_references_abort_once() {
    init_tracing();
    let mut image = physics().image;
    let module_scope = Token::from_parts(TableId::Module, 1);
    image.type_ref(module_scope, "Physics", "Missing");
    image.type_ref(module_scope, "Physics", "Missing");
    let module = import(&image);

    let sink = WriterSink::new(Vec::new());
    let error = normalize_module(&module, NormalizationOptions::default(), &sink)
        .err()
        .unwrap();

    assert!(error.is_silent_abort());
    assert_eq!(
        error.to_string(),
        "Aborted: Failed to resolve 2 external references"
    );

    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(output.lines().count(), 2, "{output}");
    assert!(output.contains("0x01000003"), "{output}");
    assert!(output.contains("0x01000004"), "{output}");
    assert!(output.contains("Physics.Missing"), "{output}");
}

#[test]
fn test_missing_base_type_aborts_before_the_hierarchy_is_built() {
    let mut image = physics().image;
    let missing = image.type_ref(
        Token::from_parts(TableId::Module, 1),
        "Physics",
        "MissingBase",
    );
    let derived = image.type_def("Physics", "Derived", Some(missing));
    let module = import(&image);

    let sink = WriterSink::new(Vec::new());
    let error = normalize_module(&module, NormalizationOptions::default(), &sink)
        .err()
        .unwrap();

    assert!(error.is_silent_abort(), "{error}");
    assert!(!error.is_unresolved());
    assert_eq!(
        error.to_string(),
        "Aborted: Failed to resolve 1 external references"
    );

    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(output.lines().count(), 1, "{output}");
    assert!(output.contains("Physics.MissingBase"), "{output}");
    assert!(!output.contains(&derived.to_string()), "{output}");
}

#[test]
fn test_missing_member_of_a_local_root_type_aborts() {
    let mut image = physics().image;
    let standalone = image.type_def("Physics", "Standalone", None);
    image.member_ref(standalone, "Spin", &[0x20, 0x00, 0x01]);
    let module = import(&image);

    let sink = WriterSink::new(Vec::new());
    let error = normalize_module(&module, NormalizationOptions::default(), &sink)
        .err()
        .unwrap();

    assert!(error.is_silent_abort(), "{error}");
    assert_eq!(
        error.to_string(),
        "Aborted: Failed to resolve 1 external references"
    );

    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert!(output.contains("Physics.Standalone"), "{output}");
    assert!(output.contains("Spin"), "{output}");
}

#[test]
fn test_member_not_declared_locally_may_be_inherited() -> Result<()> {
    let mut fixture = physics();
    let spin = fixture
        .image
        .member_ref(fixture.particle, "Spin", &[0x20, 0x00, 0x01]);
    let module = import(&fixture.image);

    let sink = WriterSink::new(Vec::new());
    let graph = normalize_module(&module, NormalizationOptions::default(), &sink)?;
    assert!(sink.into_inner().is_empty());

    let Some(NormalizedObject::Type(particle)) = graph.get(fixture.particle) else {
        panic!("Particle was not normalized");
    };
    match graph.get(spin) {
        Some(NormalizedObject::Member(NormalizedMember::Reference(reference))) => {
            assert_eq!(reference.name, "Spin");
            match &reference.parent {
                MemberParent::Type(parent) => assert_eq!(parent.type_id(), Some(particle)),
                other => panic!("unexpected parent {other:?}"),
            }
        }
        other => panic!("unexpected Spin {other:?}"),
    }
    Ok(())
}

#[test]
fn test_strict_options_fail_on_first_unresolved_reference() {
    let mut image = physics().image;
    image.type_ref(Token::from_parts(TableId::Module, 1), "Physics", "Missing");
    let module = import(&image);

    let error = normalize_module(
        &module,
        NormalizationOptions::strict(),
        &WriterSink::new(std::io::sink()),
    )
    .err()
    .unwrap();
    assert!(error.is_unresolved(), "{error}");
}

#[test]
fn test_class_and_value_type_references_differ() -> Result<()> {
    let mut fixture = physics();
    fixture
        .image
        .field("boxed", &[vec![0x06], named_type(CLASS, fixture.vector)].concat());
    let module = import(&fixture.image);
    let graph = normalize_module(
        &module,
        NormalizationOptions::default(),
        &WriterSink::new(std::io::sink()),
    )?;

    let Some(NormalizedObject::Field(boxed)) = graph.get(Token::from_parts(TableId::Field, 5))
    else {
        panic!("boxed was not normalized");
    };
    let Some(NormalizedObject::Field(position)) = graph.get(Token::from_parts(TableId::Field, 3))
    else {
        panic!("position was not normalized");
    };

    assert!(matches!(*boxed.field_type, TypeSig::Class(_)));
    assert!(matches!(*position.field_type, TypeSig::ValueType(_)));
    assert_eq!(boxed.field_type.type_id(), position.field_type.type_id());
    Ok(())
}
