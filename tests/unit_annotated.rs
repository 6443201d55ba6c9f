use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use canister::annotated::{
    EnhancedField, EnhancedMethod, EnhancedType, SlimField, SlimMethod, SlimParameter,
};
use canister::reflect::{
    Annotation, AnnotationRef, ClassId, Instance, Invoker, MethodResolver, RawField, RawMethod,
    RawParameter, TypeHierarchy, TypeRef, Value,
};
use canister::{CdiError, CdiResult};

// ===== Fixtures =====

struct Greeter {
    greeting: String,
}

impl Greeter {
    fn greet(&self, name: &str) -> String {
        format!("{} {}", self.greeting, name)
    }
}

struct LoudGreeter {
    greeting: String,
}

impl LoudGreeter {
    fn greet(&self, name: &str) -> String {
        format!("{} {}!", self.greeting.to_uppercase(), name)
    }
}

#[derive(Debug)]
struct Inject;

impl Annotation for Inject {
    fn annotation_type(&self) -> ClassId {
        ClassId::of::<Inject>()
    }
    fn name(&self) -> &'static str {
        "Inject"
    }
}

#[derive(Debug)]
struct Observes;

impl Annotation for Observes {
    fn annotation_type(&self) -> ClassId {
        ClassId::of::<Observes>()
    }
    fn name(&self) -> &'static str {
        "Observes"
    }
}

struct FlatHierarchy;

impl TypeHierarchy for FlatHierarchy {
    fn direct_supertypes(&self, _: &TypeRef) -> Vec<TypeRef> {
        Vec::new()
    }
}

fn hierarchy() -> Arc<dyn TypeHierarchy> {
    Arc::new(FlatHierarchy)
}

fn greeter_type() -> Arc<EnhancedType> {
    EnhancedType::new(TypeRef::of::<Greeter>(), Vec::new(), Vec::new(), hierarchy())
}

fn greet_raw() -> RawMethod {
    let invoker: Invoker = Arc::new(|instance: &Instance, args: &[Value]| {
        let greeter = instance
            .downcast_ref::<Greeter>()
            .ok_or(CdiError::IllegalAccess("greet"))?;
        let name = args[0]
            .downcast_ref::<String>()
            .ok_or(CdiError::IllegalAccess("greet"))?;
        Ok(Arc::new(greeter.greet(name)) as Value)
    });
    RawMethod::new(
        "greet",
        TypeRef::of::<Greeter>(),
        vec![TypeRef::of::<String>()],
        TypeRef::of::<String>(),
        invoker,
    )
}

fn greet_method(annotations: Vec<AnnotationRef>) -> EnhancedMethod {
    let slim = Arc::new(SlimMethod::with_plain_parameters(greet_raw(), annotations));
    EnhancedMethod::of(slim, greeter_type(), hierarchy()).expect("valid method descriptor")
}

/// Counts slow-path lookups so cache idempotence is observable.
struct StubResolver {
    lookups: AtomicUsize,
}

impl StubResolver {
    fn new() -> Self {
        Self { lookups: AtomicUsize::new(0) }
    }

    fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl MethodResolver for StubResolver {
    fn resolve(
        &self,
        class: ClassId,
        name: &'static str,
        _parameter_types: &[TypeRef],
    ) -> CdiResult<RawMethod> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if class == ClassId::of::<LoudGreeter>() && name == "greet" {
            let invoker: Invoker = Arc::new(|instance: &Instance, args: &[Value]| {
                let greeter = instance
                    .downcast_ref::<LoudGreeter>()
                    .ok_or(CdiError::IllegalAccess("greet"))?;
                let name = args[0]
                    .downcast_ref::<String>()
                    .ok_or(CdiError::IllegalAccess("greet"))?;
                Ok(Arc::new(greeter.greet(name)) as Value)
            });
            Ok(RawMethod::new(
                "greet",
                TypeRef::of::<LoudGreeter>(),
                vec![TypeRef::of::<String>()],
                TypeRef::of::<String>(),
                invoker,
            ))
        } else {
            Err(CdiError::NoSuchMethod { class: "unknown", method: name })
        }
    }
}

fn string_arg(value: &str) -> Vec<Value> {
    vec![Arc::new(value.to_string()) as Value]
}

// ===== Construction and validation =====

#[test]
fn construction_fails_fast_on_parameter_count_mismatch() {
    // no parameter snapshots for a one-parameter method
    let slim = Arc::new(SlimMethod::new(greet_raw(), Vec::new(), Vec::new()));
    let err = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap_err();
    assert!(matches!(
        err,
        CdiError::ParameterCountMismatch { method: "greet", expected: 1, actual: 0 }
    ));
}

#[test]
fn construction_fails_fast_on_excess_parameters() {
    let extra = (0..2)
        .map(|position| {
            Arc::new(SlimParameter::new(
                RawParameter::new(position, TypeRef::of::<String>()),
                Vec::new(),
            ))
        })
        .collect();
    let slim = Arc::new(SlimMethod::new(greet_raw(), Vec::new(), extra));
    let err = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap_err();
    assert!(matches!(
        err,
        CdiError::ParameterCountMismatch { expected: 1, actual: 2, .. }
    ));
}

#[test]
fn slim_round_trips_for_every_descriptor_kind() {
    let slim_method = Arc::new(SlimMethod::with_plain_parameters(greet_raw(), Vec::new()));
    let method =
        EnhancedMethod::of(slim_method.clone(), greeter_type(), hierarchy()).unwrap();
    assert!(Arc::ptr_eq(method.slim(), &slim_method));

    let parameter = &method.parameters()[0];
    assert!(Arc::ptr_eq(parameter.slim(), &slim_method.parameters()[0]));

    let slim_field = Arc::new(SlimField::new(
        RawField::new("greeting", TypeRef::of::<Greeter>(), TypeRef::of::<String>()),
        vec![Arc::new(Inject) as AnnotationRef],
    ));
    let field = EnhancedField::of(slim_field.clone(), greeter_type(), hierarchy());
    assert!(Arc::ptr_eq(field.slim(), &slim_field));
}

// ===== Equality and derived data =====

#[test]
fn descriptors_compare_equal_by_signature_despite_annotations() {
    let bare = greet_method(Vec::new());
    let annotated = greet_method(vec![Arc::new(Inject) as AnnotationRef]);
    assert_eq!(bare, annotated);
    assert_eq!(bare.signature(), annotated.signature());
    assert!(annotated.is_annotation_present::<Inject>());
    assert!(!bare.is_annotation_present::<Inject>());
}

#[test]
fn signature_distinguishes_parameter_types() {
    let one_param = greet_method(Vec::new());
    let no_params = {
        let invoker: Invoker = Arc::new(|_, _| Ok(Arc::new(()) as Value));
        let raw = RawMethod::new(
            "greet",
            TypeRef::of::<Greeter>(),
            Vec::new(),
            TypeRef::of::<()>(),
            invoker,
        );
        let slim = Arc::new(SlimMethod::with_plain_parameters(raw, Vec::new()));
        EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap()
    };
    assert_ne!(one_param, no_params);
}

#[test]
fn property_name_follows_accessor_convention() {
    let invoker: Invoker = Arc::new(|_, _| Ok(Arc::new(()) as Value));
    let raw = RawMethod::new(
        "get_greeting",
        TypeRef::of::<Greeter>(),
        Vec::new(),
        TypeRef::of::<String>(),
        invoker,
    );
    let slim = Arc::new(SlimMethod::with_plain_parameters(raw, Vec::new()));
    let accessor = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap();
    assert_eq!(accessor.property_name(), "greeting");

    // no convention match falls back to the raw name
    let plain = greet_method(Vec::new());
    assert_eq!(plain.property_name(), "greet");
}

#[test]
fn generic_flag_reflects_type_parameters() {
    let plain = greet_method(Vec::new());
    assert!(!plain.is_generic());

    let slim = Arc::new(SlimMethod::with_plain_parameters(
        greet_raw().with_type_parameters(1),
        Vec::new(),
    ));
    let generic = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap();
    assert!(generic.is_generic());
}

#[test]
fn parameters_can_be_filtered_by_annotation() {
    let annotated_param = Arc::new(SlimParameter::new(
        RawParameter::new(0, TypeRef::of::<String>()),
        vec![Arc::new(Observes) as AnnotationRef],
    ));
    let slim = Arc::new(SlimMethod::new(greet_raw(), Vec::new(), vec![annotated_param]));
    let method = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap();

    let observed = method.parameters_annotated_with::<Observes>();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].position(), 0);
    assert!(method.parameters_annotated_with::<Inject>().is_empty());
}

#[test]
fn is_equivalent_matches_raw_identity() {
    let method = greet_method(Vec::new());
    assert!(method.is_equivalent(&greet_raw()));

    let other = RawMethod::new(
        "greet",
        TypeRef::of::<LoudGreeter>(),
        vec![TypeRef::of::<String>()],
        TypeRef::of::<String>(),
        Arc::new(|_: &Instance, _: &[Value]| Ok(Arc::new(()) as Value)),
    );
    assert!(!method.is_equivalent(&other));
}

// ===== Invocation =====

#[test]
fn invoke_calls_the_declared_method() {
    let method = greet_method(Vec::new());
    let instance: Instance = Arc::new(Greeter { greeting: "hello".into() });
    let result = method.invoke(&instance, &string_arg("world")).unwrap();
    assert_eq!(result.downcast_ref::<String>().unwrap(), "hello world");
}

#[test]
fn invoke_rejects_wrong_argument_count() {
    let method = greet_method(Vec::new());
    let instance: Instance = Arc::new(Greeter { greeting: "hello".into() });
    let err = method.invoke(&instance, &[]).unwrap_err();
    assert!(matches!(err, CdiError::ArgumentCountMismatch { expected: 1, actual: 0, .. }));
}

#[test]
fn invoke_on_instance_uses_the_seeded_fast_path_for_the_declaring_class() {
    let method = greet_method(Vec::new());
    let resolver = StubResolver::new();
    let instance: Instance = Arc::new(Greeter { greeting: "hi".into() });

    let result = method.invoke_on_instance(&resolver, &instance, &string_arg("there")).unwrap();
    assert_eq!(result.downcast_ref::<String>().unwrap(), "hi there");
    assert_eq!(resolver.lookup_count(), 0);
}

#[test]
fn invoke_on_instance_resolves_overrides_once_per_class() {
    let method = greet_method(Vec::new());
    let resolver = StubResolver::new();
    let instance: Instance = Arc::new(LoudGreeter { greeting: "hi".into() });

    let first = method.invoke_on_instance(&resolver, &instance, &string_arg("there")).unwrap();
    assert_eq!(first.downcast_ref::<String>().unwrap(), "HI there!");
    assert_eq!(resolver.lookup_count(), 1);

    // repeated calls for the same concrete class hit the cache
    for _ in 0..5 {
        method.invoke_on_instance(&resolver, &instance, &string_arg("again")).unwrap();
    }
    assert_eq!(resolver.lookup_count(), 1);
}

#[test]
fn invoke_on_instance_surfaces_no_such_method() {
    let method = greet_method(Vec::new());
    let resolver = StubResolver::new();
    let instance: Instance = Arc::new("not a greeter".to_string());

    let err = method.invoke_on_instance(&resolver, &instance, &string_arg("x")).unwrap_err();
    assert!(matches!(err, CdiError::NoSuchMethod { method: "greet", .. }));
}

#[test]
fn invocation_target_failures_keep_their_kind() {
    let invoker: Invoker = Arc::new(|_, _| {
        Err(CdiError::InvocationTarget { method: "explode", message: "boom".into() })
    });
    let raw = RawMethod::new(
        "explode",
        TypeRef::of::<Greeter>(),
        Vec::new(),
        TypeRef::of::<()>(),
        invoker,
    );
    let slim = Arc::new(SlimMethod::with_plain_parameters(raw, Vec::new()));
    let method = EnhancedMethod::of(slim, greeter_type(), hierarchy()).unwrap();
    let instance: Instance = Arc::new(Greeter { greeting: "x".into() });

    let err = method.invoke(&instance, &[]).unwrap_err();
    assert!(matches!(err, CdiError::InvocationTarget { method: "explode", .. }));
}

// ===== Fields and parameters =====

#[test]
fn field_descriptor_exposes_identity_and_annotations() {
    let slim = Arc::new(SlimField::new(
        RawField::new("greeting", TypeRef::of::<Greeter>(), TypeRef::of::<String>()),
        vec![Arc::new(Inject) as AnnotationRef],
    ));
    let field = EnhancedField::of(slim, greeter_type(), hierarchy());

    assert_eq!(field.name(), "greeting");
    assert_eq!(field.property_name(), "greeting");
    assert_eq!(field.field_type(), &TypeRef::of::<String>());
    assert!(field.is_annotation_present::<Inject>());
    assert_eq!(field.signature().to_string(), format!("{}#greeting", field.declaring_type().name()));
    assert!(field.type_closure().contains_raw(ClassId::of::<String>()));
}

#[test]
fn fields_compare_equal_by_signature() {
    let make = |annotations: Vec<AnnotationRef>| {
        EnhancedField::of(
            Arc::new(SlimField::new(
                RawField::new("greeting", TypeRef::of::<Greeter>(), TypeRef::of::<String>()),
                annotations,
            )),
            greeter_type(),
            hierarchy(),
        )
    };
    assert_eq!(make(Vec::new()), make(vec![Arc::new(Inject) as AnnotationRef]));
}

#[test]
fn parameter_descriptors_carry_position_and_declaring_identity() {
    let method = greet_method(Vec::new());
    let parameter = &method.parameters()[0];
    assert_eq!(parameter.position(), 0);
    assert_eq!(parameter.parameter_type(), &TypeRef::of::<String>());
    assert_eq!(parameter.declaring_method(), "greet");
    assert_eq!(parameter.declaring_type().raw(), ClassId::of::<Greeter>());
    assert!(parameter.type_closure().contains_raw(ClassId::of::<String>()));
}
