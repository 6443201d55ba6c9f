//! Annotation maps backing every enhanced descriptor.

use std::any::Any;
use std::collections::HashMap;

use crate::reflect::{Annotation, AnnotationRef, ClassId};

/// Mapping from annotation-type identity to a single annotation instance.
///
/// Built once from a raw set of annotation instances, deduplicated by
/// annotation type, and immutable after construction. Every descriptor
/// tracks two of these: all (merged) annotations and directly declared
/// annotations.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use canister::reflect::{Annotation, ClassId};
/// use canister::AnnotationMap;
///
/// #[derive(Debug)]
/// struct Inject;
///
/// impl Annotation for Inject {
///     fn annotation_type(&self) -> ClassId {
///         ClassId::of::<Inject>()
///     }
///     fn name(&self) -> &'static str {
///         "Inject"
///     }
/// }
///
/// let map = AnnotationMap::build([Arc::new(Inject) as _, Arc::new(Inject) as _]);
/// assert_eq!(map.len(), 1); // deduplicated by type
/// assert!(map.get::<Inject>().is_some());
/// ```
#[derive(Debug, Default)]
pub struct AnnotationMap {
    map: HashMap<ClassId, AnnotationRef>,
}

impl AnnotationMap {
    /// Builds a map from raw annotation instances, keeping one instance per
    /// annotation type (the last one wins).
    pub fn build<I>(annotations: I) -> Self
    where
        I: IntoIterator<Item = AnnotationRef>,
    {
        let mut map = HashMap::new();
        for annotation in annotations {
            map.insert(annotation.annotation_type(), annotation);
        }
        Self { map }
    }

    /// The empty map.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether an annotation of the given type is present.
    pub fn is_present(&self, annotation_type: ClassId) -> bool {
        self.map.contains_key(&annotation_type)
    }

    /// The stored instance for the given annotation type, untyped.
    pub fn get_raw(&self, annotation_type: ClassId) -> Option<&AnnotationRef> {
        self.map.get(&annotation_type)
    }

    /// The stored instance for annotation type `A`, downcast to `A`.
    pub fn get<A: Annotation>(&self) -> Option<&A> {
        self.map
            .get(&ClassId::of::<A>())
            .and_then(|a| (a.as_ref() as &dyn Any).downcast_ref::<A>())
    }

    /// Iterates the stored annotation instances in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRef> {
        self.map.values()
    }

    /// Number of distinct annotation types stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no annotations are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
