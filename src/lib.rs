//! # canister
//!
//! A CDI-style dependency-injection container core: the enhanced-metadata
//! model and the lifecycle-event bootstrap pipeline.
//!
//! ## Features
//!
//! - **Enhanced descriptors**: immutable, thread-safe wrappers around raw
//!   reflective members with annotation maps, stable signatures, and lazily
//!   computed type closures
//! - **Instance dispatch**: per-descriptor copy-on-write cache resolving the
//!   most specific override for a concrete runtime class
//! - **Lifecycle event gating**: a monotonic observation tracker so
//!   bootstrap events nobody observes are never constructed
//! - **Extension mutation**: mutable event kinds return the
//!   extension-replaced payload to the bootstrap pipeline
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use canister::annotated::EnhancedType;
//! use canister::events::{
//!     ContainerLifecycleEvents, LifecycleEvent, ObserverMethodInfo, ProcessAnnotatedType,
//! };
//! use canister::reflect::{TypeHierarchy, TypeRef};
//! use canister::TypeClosure;
//!
//! struct FlatHierarchy;
//!
//! impl TypeHierarchy for FlatHierarchy {
//!     fn direct_supertypes(&self, _: &TypeRef) -> Vec<TypeRef> {
//!         Vec::new()
//!     }
//! }
//!
//! struct OrderService;
//!
//! // Register an extension observer for discovered types
//! let mut events = ContainerLifecycleEvents::new();
//! events.register_observer(ObserverMethodInfo::extension(
//!     TypeClosure::of(TypeRef::of::<ProcessAnnotatedType>()),
//!     "audit_ext.on_type",
//!     |event| {
//!         if let LifecycleEvent::AnnotatedType(pat) = event {
//!             assert!(pat.annotated_type().name().contains("OrderService"));
//!         }
//!         Ok(())
//!     },
//! ));
//!
//! // Fire the event for a discovered type; the observer sees it
//! let annotated = EnhancedType::new(
//!     TypeRef::of::<OrderService>(),
//!     Vec::new(),
//!     Vec::new(),
//!     Arc::new(FlatHierarchy),
//! );
//! let kept = events.fire_process_annotated_type(annotated).unwrap();
//! assert!(kept.is_some());
//!
//! // Categories nobody observes short-circuit to a no-op
//! assert!(!events.tracker().is_process_bean_observed());
//! ```
//!
//! ## Architecture
//!
//! Raw reflective data (treated as a black box behind the [`reflect`]
//! traits) is turned into annotation maps, then into enhanced descriptors
//! with lazy derived fields. The bootstrap pipeline consumes those
//! descriptors and fires lifecycle events gated by the tracker, with
//! extensions mutating bean attributes, injection points, injection
//! targets, and producers in place before the container finalizes them.

// Module declarations
pub mod annotated;
pub mod annotations;
pub mod error;
pub mod events;
pub mod lazy;
pub mod reflect;
pub mod signature;
pub mod types;

// Re-export core types
pub use annotated::{
    EnhancedField, EnhancedMethod, EnhancedParameter, EnhancedType, SlimField, SlimMethod,
    SlimParameter,
};
pub use annotations::AnnotationMap;
pub use error::{CdiError, CdiResult};
pub use events::{ContainerLifecycleEvents, LifecycleEventTracker};
pub use lazy::LazyValueHolder;
pub use signature::{FieldSignature, MethodSignature};
pub use types::TypeClosure;
