//! Member signatures: stable value-equality keys for descriptors.
//!
//! A signature identifies a member by declaring type, name, and (for
//! methods) parameter types only. Annotations and other descriptor state do
//! not participate, so two descriptors for the same member on the same type,
//! even across metadata reloads, compare equal and hash identically. Built
//! on display names rather than class identities so the key survives a
//! reload of the backing reflective data.

use std::fmt;

use crate::reflect::{RawField, RawMethod};

/// Value-equality key identifying a method.
///
/// # Examples
///
/// ```rust
/// use canister::MethodSignature;
///
/// let a = MethodSignature::new("Greeter", "greet", vec!["String"]);
/// let b = MethodSignature::new("Greeter", "greet", vec!["String"]);
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "Greeter#greet(String)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    declaring_type: &'static str,
    name: &'static str,
    parameter_types: Vec<&'static str>,
}

impl MethodSignature {
    /// Creates a signature from its parts.
    pub fn new(
        declaring_type: &'static str,
        name: &'static str,
        parameter_types: Vec<&'static str>,
    ) -> Self {
        Self { declaring_type, name, parameter_types }
    }

    /// Signature of a raw method snapshot.
    pub fn of(method: &RawMethod) -> Self {
        Self {
            declaring_type: method.declaring_type().name(),
            name: method.name(),
            parameter_types: method.parameter_types().iter().map(|t| t.name()).collect(),
        }
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring type display name.
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    /// Parameter type display names, in order.
    pub fn parameter_types(&self) -> &[&'static str] {
        &self.parameter_types
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}(", self.declaring_type, self.name)?;
        for (i, param) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// Value-equality key identifying a field by declaring type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSignature {
    declaring_type: &'static str,
    name: &'static str,
}

impl FieldSignature {
    /// Creates a signature from its parts.
    pub fn new(declaring_type: &'static str, name: &'static str) -> Self {
        Self { declaring_type, name }
    }

    /// Signature of a raw field snapshot.
    pub fn of(field: &RawField) -> Self {
        Self {
            declaring_type: field.declaring_type().name(),
            name: field.name(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring type display name.
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn method_signatures_compare_by_value() {
        let a = MethodSignature::new("Greeter", "greet", vec!["String", "usize"]);
        let b = MethodSignature::new("Greeter", "greet", vec!["String", "usize"]);
        let c = MethodSignature::new("Greeter", "greet", vec!["String"]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn declaring_type_participates() {
        let a = MethodSignature::new("Greeter", "greet", vec![]);
        let b = MethodSignature::new("Shouter", "greet", vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn field_signature_display() {
        let sig = FieldSignature::new("Config", "port");
        assert_eq!(sig.to_string(), "Config#port");
    }
}
