//! Error types for the container core.

use std::fmt;

/// Container core errors.
///
/// Covers the three failure families of the metadata and bootstrap layers:
/// structural errors raised while building descriptors, reflective
/// invocation failures surfaced with their kind preserved, and extension
/// observer failures that abort a bootstrap phase.
///
/// # Examples
///
/// ```rust
/// use canister::CdiError;
///
/// let err = CdiError::ParameterCountMismatch {
///     method: "greet",
///     expected: 2,
///     actual: 1,
/// };
/// assert!(err.to_string().contains("greet"));
/// ```
#[derive(Debug, Clone)]
pub enum CdiError {
    /// Method descriptor built from a parameter list whose length does not
    /// match the raw method's parameter count
    ParameterCountMismatch {
        /// Raw method name
        method: &'static str,
        /// Parameter count of the raw method
        expected: usize,
        /// Number of parameter snapshots supplied
        actual: usize,
    },
    /// Reflective access to the member was denied by the host runtime
    IllegalAccess(&'static str),
    /// The invoked member itself failed; the target failure is preserved
    InvocationTarget {
        /// Invoked method name
        method: &'static str,
        /// Failure message reported by the target
        message: String,
    },
    /// Override resolution found no matching method on the concrete class
    NoSuchMethod {
        /// Concrete class that was searched
        class: &'static str,
        /// Method name that was looked up
        method: &'static str,
    },
    /// Invocation supplied the wrong number of arguments
    ArgumentCountMismatch {
        /// Invoked method name
        method: &'static str,
        /// Parameter count of the resolved method
        expected: usize,
        /// Number of arguments supplied
        actual: usize,
    },
    /// An extension observer failed while a lifecycle event was being fired.
    /// Fatal to the current bootstrap phase; remaining observers are skipped.
    ObserverFailure {
        /// Event category being fired
        event: &'static str,
        /// Diagnostic label of the failing observer
        observer: String,
        /// Failure message reported by the observer
        message: String,
    },
}

impl fmt::Display for CdiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdiError::ParameterCountMismatch { method, expected, actual } => write!(
                f,
                "method {} declares {} parameter(s) but {} snapshot(s) were supplied",
                method, expected, actual
            ),
            CdiError::IllegalAccess(member) => {
                write!(f, "illegal access to member: {}", member)
            }
            CdiError::InvocationTarget { method, message } => {
                write!(f, "invocation of {} failed: {}", method, message)
            }
            CdiError::NoSuchMethod { class, method } => {
                write!(f, "no method {} on class {}", method, class)
            }
            CdiError::ArgumentCountMismatch { method, expected, actual } => write!(
                f,
                "method {} takes {} argument(s) but {} were supplied",
                method, expected, actual
            ),
            CdiError::ObserverFailure { event, observer, message } => write!(
                f,
                "observer {} failed while {} was being fired: {}",
                observer, event, message
            ),
        }
    }
}

impl std::error::Error for CdiError {}

/// Result type for container core operations
pub type CdiResult<T> = Result<T, CdiError>;
