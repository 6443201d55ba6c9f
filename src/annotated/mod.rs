//! Enhanced annotated descriptors.
//!
//! Immutable, thread-safe wrappers around slim reflective snapshots.
//! Identity attributes (member, annotations, declaring type) never change
//! after construction; only internal caches (lazy derived values, the
//! method dispatch map) mutate, and only through single-assignment or
//! copy-on-write publication. A descriptor is fully constructed, parameter
//! validation included, before it is handed to any other component.

pub mod field;
pub mod method;
pub mod parameter;
pub mod slim;

pub use field::EnhancedField;
pub use method::EnhancedMethod;
pub use parameter::EnhancedParameter;
pub use slim::{SlimField, SlimMethod, SlimParameter};

use std::sync::Arc;

use crate::annotations::AnnotationMap;
use crate::lazy::LazyValueHolder;
use crate::reflect::{Annotation, AnnotationRef, ClassId, TypeHierarchy, TypeRef};
use crate::types::TypeClosure;

/// Enhanced descriptor of a declaring type.
///
/// Owned by the descriptor registry; member descriptors hold a shared
/// reference for containment and reporting. Tracks the merged and declared
/// annotation maps separately because type-level annotations can be
/// inherited.
#[derive(Debug)]
pub struct EnhancedType {
    type_ref: TypeRef,
    annotations: AnnotationMap,
    declared_annotations: AnnotationMap,
    type_closure: LazyValueHolder<TypeClosure>,
}

impl EnhancedType {
    /// Builds a type descriptor.
    ///
    /// `annotations` is the merged (inherited) set, `declared_annotations`
    /// the directly present set. The type closure is computed lazily over
    /// `hierarchy` on first access, at most once.
    pub fn new(
        type_ref: TypeRef,
        annotations: Vec<AnnotationRef>,
        declared_annotations: Vec<AnnotationRef>,
        hierarchy: Arc<dyn TypeHierarchy>,
    ) -> Arc<Self> {
        let closure_base = type_ref.clone();
        Arc::new(Self {
            type_ref,
            annotations: AnnotationMap::build(annotations),
            declared_annotations: AnnotationMap::build(declared_annotations),
            type_closure: LazyValueHolder::new(move || {
                TypeClosure::compute(closure_base.clone(), hierarchy.as_ref())
            }),
        })
    }

    /// The described type.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Display name of the described type.
    pub fn name(&self) -> &'static str {
        self.type_ref.name()
    }

    /// Merged annotation map.
    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    /// Directly declared annotation map.
    pub fn declared_annotations(&self) -> &AnnotationMap {
        &self.declared_annotations
    }

    /// Whether an annotation of type `A` is present (merged view).
    pub fn is_annotation_present<A: Annotation>(&self) -> bool {
        self.annotations.is_present(ClassId::of::<A>())
    }

    /// The annotation of type `A`, if present (merged view).
    pub fn annotation<A: Annotation>(&self) -> Option<&A> {
        self.annotations.get::<A>()
    }

    /// The full set of types this type is assignable to, computed on first
    /// access and cached for the descriptor's lifetime.
    pub fn type_closure(&self) -> &TypeClosure {
        self.type_closure.get()
    }

    /// Whether this descriptor describes the same erased class.
    pub fn is_equivalent(&self, other: &TypeRef) -> bool {
        self.type_ref.raw() == other.raw()
    }
}
