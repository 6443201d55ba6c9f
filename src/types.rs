//! Type closure computation.

use std::collections::{BTreeSet, VecDeque};

use crate::reflect::{ClassId, TypeHierarchy, TypeRef};

/// The full set of types a declared type is assignable to.
///
/// Contains the type itself, every superclass, every implemented or
/// inherited interface (parameterization preserved), and the universal
/// root. Computation walks the supertype graph breadth-first over a
/// [`TypeHierarchy`]; it is expensive, so descriptors keep the result in a
/// lazy holder computed at most once per descriptor.
///
/// Recomputation from a fresh holder is always safe: the walk is
/// deterministic and side-effect-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClosure {
    base: TypeRef,
    types: BTreeSet<TypeRef>,
}

impl TypeClosure {
    /// Computes the closure of `base` over the supplied hierarchy.
    pub fn compute(base: TypeRef, hierarchy: &dyn TypeHierarchy) -> Self {
        let mut types = BTreeSet::new();
        let mut pending = VecDeque::new();
        pending.push_back(base.clone());
        while let Some(next) = pending.pop_front() {
            let supertypes = hierarchy.direct_supertypes(&next);
            if types.insert(next) {
                pending.extend(supertypes);
            }
        }
        types.insert(TypeRef::universal());
        Self { base, types }
    }

    /// The degenerate closure of a type with no known supertypes.
    pub fn of(base: TypeRef) -> Self {
        Self::from_types(base, std::iter::empty())
    }

    /// Builds a closure from an externally supplied supertype set.
    ///
    /// The base type and the universal root are always included.
    pub fn from_types<I>(base: TypeRef, supertypes: I) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let mut types: BTreeSet<TypeRef> = supertypes.into_iter().collect();
        types.insert(base.clone());
        types.insert(TypeRef::universal());
        Self { base, types }
    }

    /// The type this closure was computed for.
    pub fn base(&self) -> &TypeRef {
        &self.base
    }

    /// Whether the closure contains exactly `type_ref` (parameterization
    /// included).
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.types.contains(type_ref)
    }

    /// Whether the closure contains any type with the given raw class.
    pub fn contains_raw(&self, raw: ClassId) -> bool {
        self.types.iter().any(|t| t.raw() == raw)
    }

    /// Iterates the closure in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.iter()
    }

    /// Number of distinct types in the closure.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false; a closure contains at least its base type.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
