//! Reflective introspection primitives.
//!
//! The container treats type and member introspection as an external
//! capability supplied by the host runtime. This module defines the minimal
//! surface the metadata layer consumes: type references, annotation
//! instances, raw member snapshots, and the two lookup collaborators
//! ([`MethodResolver`] for override resolution, [`TypeHierarchy`] for
//! supertype walks). Everything here is query-only; the container never
//! mutates host reflective data.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{CdiError, CdiResult};

/// Identity of a concrete class known to the host runtime.
///
/// Wraps a `TypeId` so concrete runtime instances (held as `dyn Any`) can be
/// mapped back to their class without any registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(TypeId);

impl ClassId {
    /// Identity of the class backing `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        ClassId(TypeId::of::<T>())
    }

    /// The universal root every type is assignable to.
    pub fn universal() -> Self {
        ClassId::of::<dyn Any>()
    }

    /// Whether this is the universal root.
    pub fn is_universal(&self) -> bool {
        *self == ClassId::universal()
    }
}

/// Concrete class of a runtime instance.
pub fn class_of(instance: &Instance) -> ClassId {
    ClassId((**instance).type_id())
}

/// A possibly-parameterized type reference.
///
/// Carries the raw class identity, a display name, and ordered type
/// arguments so generic parameterization survives type-closure walks.
/// Ordered and hashable so closures can live in sorted sets.
///
/// # Examples
///
/// ```rust
/// use canister::reflect::TypeRef;
///
/// let plain = TypeRef::of::<String>();
/// assert!(!plain.is_parameterized());
///
/// let list = TypeRef::parameterized::<Vec<String>>(vec![TypeRef::of::<String>()]);
/// assert_eq!(list.type_arguments().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    raw: ClassId,
    name: &'static str,
    args: Vec<TypeRef>,
}

impl TypeRef {
    /// Unparameterized reference to the class backing `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeRef {
            raw: ClassId::of::<T>(),
            name: std::any::type_name::<T>(),
            args: Vec::new(),
        }
    }

    /// Reference to `T` carrying explicit type arguments.
    pub fn parameterized<T: ?Sized + 'static>(args: Vec<TypeRef>) -> Self {
        TypeRef {
            raw: ClassId::of::<T>(),
            name: std::any::type_name::<T>(),
            args,
        }
    }

    /// The universal root type.
    pub fn universal() -> Self {
        TypeRef {
            raw: ClassId::universal(),
            name: std::any::type_name::<dyn Any>(),
            args: Vec::new(),
        }
    }

    /// Raw (erased) class identity.
    pub fn raw(&self) -> ClassId {
        self.raw
    }

    /// Display name of the referenced type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ordered type arguments; empty for unparameterized references.
    pub fn type_arguments(&self) -> &[TypeRef] {
        &self.args
    }

    /// Whether this reference carries type arguments.
    pub fn is_parameterized(&self) -> bool {
        !self.args.is_empty()
    }

    /// Whether this is the universal root.
    pub fn is_universal(&self) -> bool {
        self.raw.is_universal()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// A typed annotation instance attached to a type or member.
///
/// Annotations are deduplicated by [`Annotation::annotation_type`] when
/// annotation maps are built; at most one instance per annotation type
/// survives on any descriptor.
pub trait Annotation: Any + Send + Sync + fmt::Debug {
    /// Identity of the annotation type; conventionally `ClassId::of::<Self>()`.
    fn annotation_type(&self) -> ClassId;

    /// Short display name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Shared annotation instance.
pub type AnnotationRef = Arc<dyn Annotation>;

/// A runtime object managed by the host.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// An erased argument or return value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Erased invocation entry point supplied by the host for each raw method.
pub type Invoker = Arc<dyn Fn(&Instance, &[Value]) -> CdiResult<Value> + Send + Sync>;

/// Raw reflective snapshot of a method.
///
/// Pure data plus the host-supplied invoker; the enhanced layer never
/// inspects the host type system beyond what is captured here.
#[derive(Clone)]
pub struct RawMethod {
    name: &'static str,
    declaring_type: TypeRef,
    parameter_types: Vec<TypeRef>,
    return_type: TypeRef,
    type_parameter_count: usize,
    invoker: Invoker,
}

impl RawMethod {
    /// Creates a non-generic raw method snapshot.
    pub fn new(
        name: &'static str,
        declaring_type: TypeRef,
        parameter_types: Vec<TypeRef>,
        return_type: TypeRef,
        invoker: Invoker,
    ) -> Self {
        Self {
            name,
            declaring_type,
            parameter_types,
            return_type,
            type_parameter_count: 0,
            invoker,
        }
    }

    /// Marks the method as declaring `count` type parameters.
    pub fn with_type_parameters(mut self, count: usize) -> Self {
        self.type_parameter_count = count;
        self
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring type reference.
    pub fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
    }

    /// Ordered parameter types.
    pub fn parameter_types(&self) -> &[TypeRef] {
        &self.parameter_types
    }

    /// Return type reference.
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// Number of type parameters the method declares.
    pub fn type_parameter_count(&self) -> usize {
        self.type_parameter_count
    }

    /// Invokes the method exactly as declared, with no override resolution.
    ///
    /// Argument arity is validated here; everything else is the invoker's
    /// responsibility and surfaces as a tagged [`CdiError`].
    pub fn invoke(&self, instance: &Instance, args: &[Value]) -> CdiResult<Value> {
        if args.len() != self.parameter_types.len() {
            return Err(CdiError::ArgumentCountMismatch {
                method: self.name,
                expected: self.parameter_types.len(),
                actual: args.len(),
            });
        }
        (self.invoker)(instance, args)
    }
}

impl fmt::Debug for RawMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMethod")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .field("type_parameter_count", &self.type_parameter_count)
            .finish_non_exhaustive()
    }
}

/// Raw reflective snapshot of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    name: &'static str,
    declaring_type: TypeRef,
    field_type: TypeRef,
}

impl RawField {
    /// Creates a raw field snapshot.
    pub fn new(name: &'static str, declaring_type: TypeRef, field_type: TypeRef) -> Self {
        Self { name, declaring_type, field_type }
    }

    /// Field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring type reference.
    pub fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
    }

    /// Declared field type.
    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }
}

/// Raw reflective snapshot of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    position: usize,
    parameter_type: TypeRef,
}

impl RawParameter {
    /// Creates a raw parameter snapshot.
    pub fn new(position: usize, parameter_type: TypeRef) -> Self {
        Self { position, parameter_type }
    }

    /// Zero-based position in the declaring method's parameter list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Declared parameter type.
    pub fn parameter_type(&self) -> &TypeRef {
        &self.parameter_type
    }
}

/// Slow-path override lookup collaborator.
///
/// Resolves the most specific override of a named method on a concrete
/// class. Resolution is expensive; callers cache the result per concrete
/// class and tolerate racy duplicate lookups.
pub trait MethodResolver: Send + Sync {
    /// Resolves `name(parameter_types)` on `class`.
    ///
    /// Fails with [`CdiError::NoSuchMethod`] when the concrete class has no
    /// matching method.
    fn resolve(
        &self,
        class: ClassId,
        name: &'static str,
        parameter_types: &[TypeRef],
    ) -> CdiResult<RawMethod>;
}

/// Supertype supplier for type-closure computation.
pub trait TypeHierarchy: Send + Sync {
    /// Direct supertypes of `type_ref` (superclass and implemented
    /// interfaces), with generic parameterization preserved. Leaf types
    /// return an empty vector.
    fn direct_supertypes(&self, type_ref: &TypeRef) -> Vec<TypeRef>;
}

/// Derives a property name from an accessor method name.
///
/// `get_foo`/`getFoo` and `is_foo`/`isFoo` map to `foo`; anything else does
/// not match the convention and yields `None`.
///
/// # Examples
///
/// ```rust
/// use canister::reflect::property_name;
///
/// assert_eq!(property_name("get_name").as_deref(), Some("name"));
/// assert_eq!(property_name("isEmpty").as_deref(), Some("empty"));
/// assert_eq!(property_name("compute"), None);
/// ```
pub fn property_name(method_name: &str) -> Option<String> {
    let rest = method_name
        .strip_prefix("get")
        .or_else(|| method_name.strip_prefix("is"))?;
    if let Some(tail) = rest.strip_prefix('_') {
        if tail.is_empty() {
            return None;
        }
        return Some(tail.to_string());
    }
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().chain(chars).collect())
}
