//! Enhanced method descriptors and instance-dispatch resolution.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::annotations::AnnotationMap;
use crate::error::{CdiError, CdiResult};
use crate::lazy::LazyValueHolder;
use crate::reflect::{
    self, Annotation, ClassId, Instance, MethodResolver, RawMethod, TypeHierarchy, TypeRef, Value,
};
use crate::signature::MethodSignature;
use crate::types::TypeClosure;

use super::parameter::EnhancedParameter;
use super::slim::SlimMethod;
use super::EnhancedType;

/// Per-descriptor cache mapping a concrete runtime class to the most
/// specific overriding method.
///
/// Grows monotonically. The map is replaced wholesale (old entries + one new
/// entry, published as a fresh immutable map) under a writer lock, so
/// readers never observe a torn map. Two racing slow paths may resolve the
/// same method twice; the second publication re-reads the current map, so
/// duplicate computation is tolerated and lost updates are not.
struct DispatchCache {
    methods: RwLock<Arc<HashMap<ClassId, RawMethod>>>,
}

impl DispatchCache {
    /// Seeds the cache with the declaring class mapped to the declared
    /// method.
    fn seeded(class: ClassId, method: RawMethod) -> Self {
        let mut map = HashMap::with_capacity(1);
        map.insert(class, method);
        Self { methods: RwLock::new(Arc::new(map)) }
    }

    fn get(&self, class: ClassId) -> Option<RawMethod> {
        self.methods.read().get(&class).cloned()
    }

    fn publish(&self, class: ClassId, method: RawMethod) {
        let mut current = self.methods.write();
        let mut next = HashMap::clone(current.as_ref());
        next.insert(class, method);
        *current = Arc::new(next);
    }

    fn len(&self) -> usize {
        self.methods.read().len()
    }
}

impl fmt::Debug for DispatchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchCache")
            .field("cached_classes", &self.len())
            .finish()
    }
}

/// Enhanced descriptor of a method.
///
/// Immutable and thread-safe. Identity attributes never change after
/// construction; only the dispatch cache and the lazily computed derived
/// values mutate, through safe publication. Equality and hashing go by
/// [`MethodSignature`], so descriptors for the same method on the same type
/// compare equal even when built from differently annotated snapshots.
#[derive(Debug)]
pub struct EnhancedMethod {
    slim: Arc<SlimMethod>,
    declaring_type: Arc<EnhancedType>,
    annotations: AnnotationMap,
    declared_annotations: AnnotationMap,
    parameters: Vec<EnhancedParameter>,
    property_name: String,
    signature: LazyValueHolder<MethodSignature>,
    type_closure: LazyValueHolder<TypeClosure>,
    dispatch: DispatchCache,
}

impl EnhancedMethod {
    /// Builds a method descriptor from its slim snapshot.
    ///
    /// Fails fast with [`CdiError::ParameterCountMismatch`] when the
    /// snapshot's parameter list does not match the raw method's parameter
    /// count; a partially built descriptor is never published.
    pub fn of(
        slim: Arc<SlimMethod>,
        declaring_type: Arc<EnhancedType>,
        hierarchy: Arc<dyn TypeHierarchy>,
    ) -> CdiResult<Self> {
        let raw = slim.raw();
        if slim.parameters().len() != raw.parameter_types().len() {
            return Err(CdiError::ParameterCountMismatch {
                method: raw.name(),
                expected: raw.parameter_types().len(),
                actual: slim.parameters().len(),
            });
        }

        let parameters = slim
            .parameters()
            .iter()
            .map(|parameter| {
                EnhancedParameter::of(
                    parameter.clone(),
                    raw.name(),
                    raw.declaring_type().clone(),
                    hierarchy.clone(),
                )
            })
            .collect();

        let property_name = reflect::property_name(raw.name())
            .unwrap_or_else(|| raw.name().to_string());

        let annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let declared_annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let dispatch = DispatchCache::seeded(raw.declaring_type().raw(), raw.clone());

        let signature_source = slim.clone();
        let closure_base = raw.return_type().clone();

        Ok(Self {
            slim,
            declaring_type,
            annotations,
            declared_annotations,
            parameters,
            property_name,
            signature: LazyValueHolder::new(move || MethodSignature::of(signature_source.raw())),
            type_closure: LazyValueHolder::new(move || {
                TypeClosure::compute(closure_base.clone(), hierarchy.as_ref())
            }),
            dispatch,
        })
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        self.slim.name()
    }

    /// Declaring type descriptor.
    pub fn declaring_type(&self) -> &Arc<EnhancedType> {
        &self.declaring_type
    }

    /// Enhanced parameter descriptors, in declaration order.
    pub fn parameters(&self) -> &[EnhancedParameter] {
        &self.parameters
    }

    /// Parameter descriptors carrying an annotation of type `A`.
    pub fn parameters_annotated_with<A: Annotation>(&self) -> Vec<&EnhancedParameter> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.is_annotation_present::<A>())
            .collect()
    }

    /// Raw parameter types, in declaration order.
    pub fn parameter_types(&self) -> &[TypeRef] {
        self.slim.raw().parameter_types()
    }

    /// Whether the method declares its own type parameters.
    pub fn is_generic(&self) -> bool {
        self.slim.raw().type_parameter_count() > 0
    }

    /// Derived property name: the accessor convention when it matches,
    /// otherwise the raw method name.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Merged annotation map.
    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Directly declared annotation map.
    pub fn declared_annotations(&self) -> &AnnotationMap {
        &self.declared_annotations
    }

    /// Whether an annotation of type `A` is present.
    pub fn is_annotation_present<A: Annotation>(&self) -> bool {
        self.annotations.is_present(ClassId::of::<A>())
    }

    /// The annotation of type `A`, if present.
    pub fn annotation<A: Annotation>(&self) -> Option<&A> {
        self.annotations.get::<A>()
    }

    /// Stable identity key, computed on first access; usable as a map key
    /// across metadata reloads.
    pub fn signature(&self) -> &MethodSignature {
        self.signature.get()
    }

    /// Closure of the return type, computed on first access.
    pub fn type_closure(&self) -> &TypeClosure {
        self.type_closure.get()
    }

    /// The slim snapshot this descriptor was built from.
    pub fn slim(&self) -> &Arc<SlimMethod> {
        &self.slim
    }

    /// Whether this descriptor and a raw method denote the same member:
    /// same erased declaring class, name, and parameter types.
    pub fn is_equivalent(&self, method: &RawMethod) -> bool {
        self.declaring_type.is_equivalent(method.declaring_type())
            && self.name() == method.name()
            && self.parameter_types() == method.parameter_types()
    }

    /// Invokes the originally declared method, with no override resolution.
    ///
    /// Use when the static method reference is already known to be the
    /// correct target.
    pub fn invoke(&self, instance: &Instance, args: &[Value]) -> CdiResult<Value> {
        self.slim.raw().invoke(instance, args)
    }

    /// Resolves and invokes the most specific override for the instance's
    /// concrete class.
    ///
    /// Fast path: the concrete class is already in the dispatch cache.
    /// Slow path: `resolver` performs the expensive lookup, and the result
    /// is published copy-on-write. The same method may be resolved twice
    /// under a race, which is harmless; the publication re-reads the
    /// current map so no entry is lost.
    pub fn invoke_on_instance(
        &self,
        resolver: &dyn MethodResolver,
        instance: &Instance,
        args: &[Value],
    ) -> CdiResult<Value> {
        let class = reflect::class_of(instance);
        let method = match self.dispatch.get(class) {
            Some(method) => method,
            None => {
                trace!(method = self.name(), "dispatch cache miss, resolving override");
                let resolved = resolver.resolve(class, self.name(), self.parameter_types())?;
                self.dispatch.publish(class, resolved.clone());
                resolved
            }
        };
        method.invoke(instance, args)
    }
}

impl PartialEq for EnhancedMethod {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for EnhancedMethod {}

impl Hash for EnhancedMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature().hash(state);
    }
}

impl fmt::Display for EnhancedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}
