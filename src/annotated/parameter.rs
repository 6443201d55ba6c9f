//! Enhanced method-parameter descriptors.

use std::sync::Arc;

use crate::annotations::AnnotationMap;
use crate::lazy::LazyValueHolder;
use crate::reflect::{Annotation, ClassId, TypeHierarchy, TypeRef};
use crate::types::TypeClosure;

use super::slim::SlimParameter;

/// Enhanced descriptor of a single method parameter.
///
/// Immutable after construction. Carries the parameter's annotation map,
/// its position, a reference to the declaring method's identity, and the
/// lazily computed closure of the parameter type.
#[derive(Debug)]
pub struct EnhancedParameter {
    slim: Arc<SlimParameter>,
    declaring_method: &'static str,
    declaring_type: TypeRef,
    annotations: AnnotationMap,
    declared_annotations: AnnotationMap,
    type_closure: LazyValueHolder<TypeClosure>,
}

impl EnhancedParameter {
    /// Builds a parameter descriptor from its slim snapshot.
    pub fn of(
        slim: Arc<SlimParameter>,
        declaring_method: &'static str,
        declaring_type: TypeRef,
        hierarchy: Arc<dyn TypeHierarchy>,
    ) -> Self {
        let annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let declared_annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let closure_base = slim.parameter_type().clone();
        Self {
            slim,
            declaring_method,
            declaring_type,
            annotations,
            declared_annotations,
            type_closure: LazyValueHolder::new(move || {
                TypeClosure::compute(closure_base.clone(), hierarchy.as_ref())
            }),
        }
    }

    /// Zero-based position in the declaring method's parameter list.
    pub fn position(&self) -> usize {
        self.slim.position()
    }

    /// Declared parameter type.
    pub fn parameter_type(&self) -> &TypeRef {
        self.slim.parameter_type()
    }

    /// Name of the declaring method.
    pub fn declaring_method(&self) -> &'static str {
        self.declaring_method
    }

    /// Type declaring the method this parameter belongs to.
    pub fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
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

    /// Closure of the parameter type, computed on first access.
    pub fn type_closure(&self) -> &TypeClosure {
        self.type_closure.get()
    }

    /// The slim snapshot this descriptor was built from.
    pub fn slim(&self) -> &Arc<SlimParameter> {
        &self.slim
    }
}
