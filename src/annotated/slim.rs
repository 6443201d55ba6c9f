//! Slim annotated-member snapshots.
//!
//! The minimal immutable representation the enhanced layer wraps. A slim
//! snapshot is exactly what the host discovery produced: the raw member plus
//! its annotation instances, nothing derived. Every enhanced descriptor can
//! unwrap back to the snapshot it was built from via `slim()`.

use std::sync::Arc;

use crate::reflect::{AnnotationRef, RawField, RawMethod, RawParameter, TypeRef};

/// Slim snapshot of a method parameter.
#[derive(Debug, Clone)]
pub struct SlimParameter {
    raw: RawParameter,
    annotations: Vec<AnnotationRef>,
}

impl SlimParameter {
    /// Creates a parameter snapshot.
    pub fn new(raw: RawParameter, annotations: Vec<AnnotationRef>) -> Self {
        Self { raw, annotations }
    }

    /// The raw parameter.
    pub fn raw(&self) -> &RawParameter {
        &self.raw
    }

    /// Zero-based position in the declaring method's parameter list.
    pub fn position(&self) -> usize {
        self.raw.position()
    }

    /// Declared parameter type.
    pub fn parameter_type(&self) -> &TypeRef {
        self.raw.parameter_type()
    }

    /// Annotation instances directly present on the parameter.
    pub fn annotations(&self) -> &[AnnotationRef] {
        &self.annotations
    }
}

/// Slim snapshot of a field.
#[derive(Debug, Clone)]
pub struct SlimField {
    raw: RawField,
    annotations: Vec<AnnotationRef>,
}

impl SlimField {
    /// Creates a field snapshot.
    pub fn new(raw: RawField, annotations: Vec<AnnotationRef>) -> Self {
        Self { raw, annotations }
    }

    /// The raw field.
    pub fn raw(&self) -> &RawField {
        &self.raw
    }

    /// Field name.
    pub fn name(&self) -> &'static str {
        self.raw.name()
    }

    /// Annotation instances directly present on the field.
    pub fn annotations(&self) -> &[AnnotationRef] {
        &self.annotations
    }
}

/// Slim snapshot of a method, including its parameter snapshots.
#[derive(Debug, Clone)]
pub struct SlimMethod {
    raw: RawMethod,
    annotations: Vec<AnnotationRef>,
    parameters: Vec<Arc<SlimParameter>>,
}

impl SlimMethod {
    /// Creates a method snapshot from explicit parameter snapshots.
    ///
    /// The parameter list is taken as supplied; structural validation
    /// against the raw method's arity happens when an enhanced descriptor
    /// is built from this snapshot.
    pub fn new(
        raw: RawMethod,
        annotations: Vec<AnnotationRef>,
        parameters: Vec<Arc<SlimParameter>>,
    ) -> Self {
        Self { raw, annotations, parameters }
    }

    /// Creates a method snapshot with unannotated parameters derived from
    /// the raw parameter types.
    pub fn with_plain_parameters(raw: RawMethod, annotations: Vec<AnnotationRef>) -> Self {
        let parameters = raw
            .parameter_types()
            .iter()
            .enumerate()
            .map(|(position, ty)| {
                Arc::new(SlimParameter::new(
                    RawParameter::new(position, ty.clone()),
                    Vec::new(),
                ))
            })
            .collect();
        Self { raw, annotations, parameters }
    }

    /// The raw method.
    pub fn raw(&self) -> &RawMethod {
        &self.raw
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        self.raw.name()
    }

    /// Annotation instances directly present on the method.
    pub fn annotations(&self) -> &[AnnotationRef] {
        &self.annotations
    }

    /// Parameter snapshots, in declaration order.
    pub fn parameters(&self) -> &[Arc<SlimParameter>] {
        &self.parameters
    }
}
