//! Enhanced field descriptors.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::annotations::AnnotationMap;
use crate::lazy::LazyValueHolder;
use crate::reflect::{Annotation, ClassId, TypeHierarchy, TypeRef};
use crate::signature::FieldSignature;
use crate::types::TypeClosure;

use super::slim::SlimField;
use super::EnhancedType;

/// Enhanced descriptor of a field.
///
/// Immutable and thread-safe. Equality and hashing go by signature
/// (declaring type + name), so two descriptors for the same field compare
/// equal regardless of annotation differences or reloads.
#[derive(Debug)]
pub struct EnhancedField {
    slim: Arc<SlimField>,
    declaring_type: Arc<EnhancedType>,
    annotations: AnnotationMap,
    declared_annotations: AnnotationMap,
    signature: LazyValueHolder<FieldSignature>,
    type_closure: LazyValueHolder<TypeClosure>,
}

impl EnhancedField {
    /// Builds a field descriptor from its slim snapshot.
    pub fn of(
        slim: Arc<SlimField>,
        declaring_type: Arc<EnhancedType>,
        hierarchy: Arc<dyn TypeHierarchy>,
    ) -> Self {
        let annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let declared_annotations = AnnotationMap::build(slim.annotations().iter().cloned());
        let signature_source = slim.clone();
        let closure_base = slim.raw().field_type().clone();
        Self {
            slim,
            declaring_type,
            annotations,
            declared_annotations,
            signature: LazyValueHolder::new(move || FieldSignature::of(signature_source.raw())),
            type_closure: LazyValueHolder::new(move || {
                TypeClosure::compute(closure_base.clone(), hierarchy.as_ref())
            }),
        }
    }

    /// Field name.
    pub fn name(&self) -> &'static str {
        self.slim.name()
    }

    /// Property name; for fields this is always the field name itself.
    pub fn property_name(&self) -> &'static str {
        self.slim.name()
    }

    /// Declared field type.
    pub fn field_type(&self) -> &TypeRef {
        self.slim.raw().field_type()
    }

    /// Declaring type descriptor.
    pub fn declaring_type(&self) -> &Arc<EnhancedType> {
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

    /// Stable identity key, computed on first access.
    pub fn signature(&self) -> &FieldSignature {
        self.signature.get()
    }

    /// Closure of the field type, computed on first access.
    pub fn type_closure(&self) -> &TypeClosure {
        self.type_closure.get()
    }

    /// The slim snapshot this descriptor was built from.
    pub fn slim(&self) -> &Arc<SlimField> {
        &self.slim
    }
}

impl PartialEq for EnhancedField {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for EnhancedField {}

impl Hash for EnhancedField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature().hash(state);
    }
}
