#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;

use canister::annotated::{EnhancedMethod, EnhancedType, SlimMethod, SlimParameter};
use canister::reflect::{
    ClassId, Instance, Invoker, MethodResolver, RawMethod, RawParameter, TypeHierarchy, TypeRef,
    Value,
};
use canister::{CdiError, CdiResult};

struct Widget;

struct FlatHierarchy;

impl TypeHierarchy for FlatHierarchy {
    fn direct_supertypes(&self, _: &TypeRef) -> Vec<TypeRef> {
        Vec::new()
    }
}

struct EchoResolver;

impl MethodResolver for EchoResolver {
    fn resolve(
        &self,
        class: ClassId,
        name: &'static str,
        parameter_types: &[TypeRef],
    ) -> CdiResult<RawMethod> {
        if class != ClassId::of::<Widget>() {
            return Err(CdiError::NoSuchMethod { class: "unknown", method: name });
        }
        let invoker: Invoker = Arc::new(|_, _| Ok(Arc::new(0u64) as Value));
        Ok(RawMethod::new(
            name,
            TypeRef::of::<Widget>(),
            parameter_types.to_vec(),
            TypeRef::of::<u64>(),
            invoker,
        ))
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let declared_params = (data[0] % 8) as usize;
    let supplied_params = (data[1] % 8) as usize;
    let supplied_args = (data[2] % 8) as usize;

    let invoker: Invoker = Arc::new(|_, args| Ok(Arc::new(args.len() as u64) as Value));
    let raw = RawMethod::new(
        "probe",
        TypeRef::of::<Widget>(),
        (0..declared_params).map(|_| TypeRef::of::<u8>()).collect(),
        TypeRef::of::<u64>(),
        invoker,
    );
    let parameters = (0..supplied_params)
        .map(|position| {
            Arc::new(SlimParameter::new(
                RawParameter::new(position, TypeRef::of::<u8>()),
                Vec::new(),
            ))
        })
        .collect();
    let slim = Arc::new(SlimMethod::new(raw, Vec::new(), parameters));

    let hierarchy: Arc<dyn TypeHierarchy> = Arc::new(FlatHierarchy);
    let declaring =
        EnhancedType::new(TypeRef::of::<Widget>(), Vec::new(), Vec::new(), hierarchy.clone());

    let method = match EnhancedMethod::of(slim, declaring, hierarchy) {
        Ok(method) => {
            assert_eq!(declared_params, supplied_params);
            method
        }
        Err(CdiError::ParameterCountMismatch { expected, actual, .. }) => {
            assert_eq!(expected, declared_params);
            assert_eq!(actual, supplied_params);
            assert_ne!(declared_params, supplied_params);
            return;
        }
        Err(other) => panic!("unexpected construction error: {other}"),
    };

    let instance: Instance = Arc::new(Widget);
    let args: Vec<Value> = (0..supplied_args).map(|_| Arc::new(0u8) as Value).collect();

    match method.invoke(&instance, &args) {
        Ok(result) => {
            assert_eq!(supplied_args, declared_params);
            assert_eq!(*result.downcast_ref::<u64>().unwrap(), supplied_args as u64);
        }
        Err(CdiError::ArgumentCountMismatch { expected, actual, .. }) => {
            assert_eq!(expected, declared_params);
            assert_eq!(actual, supplied_args);
        }
        Err(other) => panic!("unexpected invocation error: {other}"),
    }

    // the cached path agrees with the declared path for the declaring class
    if supplied_args == declared_params {
        let resolver = EchoResolver;
        let cached = method.invoke_on_instance(&resolver, &instance, &args).unwrap();
        assert_eq!(*cached.downcast_ref::<u64>().unwrap(), supplied_args as u64);
    }
});
