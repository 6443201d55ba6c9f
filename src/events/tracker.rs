//! Container lifecycle event observation tracking.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::reflect::ClassId;
use crate::types::TypeClosure;

use super::types::{
    ObserverMethodInfo, ProcessAnnotatedType, ProcessBean, ProcessBeanAttributes,
    ProcessInjectionPoint, ProcessInjectionTarget, ProcessObserverMethod, ProcessProducer,
};

/// Records which lifecycle event categories have at least one registered
/// extension observer.
///
/// Created once per container at service-registration time and consulted by
/// every `fire_process_*` entry point, so events nobody observes are never
/// constructed. Flags only ever transition false to true as observer
/// registrations are discovered; they are never reset for the tracker's
/// lifetime. Racy duplicate flag writes are idempotent, so the flags need
/// only release/acquire visibility, no locking.
///
/// # Examples
///
/// ```rust
/// use canister::events::{LifecycleEventTracker, ObserverMethodInfo, ProcessBean};
/// use canister::reflect::TypeRef;
/// use canister::TypeClosure;
///
/// let tracker = LifecycleEventTracker::new();
/// assert!(!tracker.is_process_bean_observed());
///
/// tracker.register_observer(&ObserverMethodInfo::extension(
///     TypeClosure::of(TypeRef::of::<ProcessBean>()),
///     "my_ext.collect_beans",
///     |_| Ok(()),
/// ));
/// assert!(tracker.is_process_bean_observed());
/// assert!(!tracker.is_process_producer_observed());
/// ```
#[derive(Debug, Default)]
pub struct LifecycleEventTracker {
    everything_observed: AtomicBool,
    process_annotated_type_observed: AtomicBool,
    process_bean_observed: AtomicBool,
    process_bean_attributes_observed: AtomicBool,
    process_injection_point_observed: AtomicBool,
    process_injection_target_observed: AtomicBool,
    process_producer_observed: AtomicBool,
    process_observer_method_observed: AtomicBool,
}

impl LifecycleEventTracker {
    /// Creates a tracker with no categories observed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observer registration.
    ///
    /// Only extension-backed observer methods count; anything else is
    /// ignored here.
    pub fn register_observer(&self, observer: &ObserverMethodInfo) {
        if observer.is_extension_backed() {
            self.register_observed_type(observer.observed_closure());
        }
    }

    fn register_observed_type(&self, observed: &TypeClosure) {
        if self.everything_observed.load(Ordering::Acquire) {
            return;
        }

        let raw = observed.base().raw();
        if raw.is_universal() {
            self.everything_observed.store(true, Ordering::Release);
            return;
        }

        // Extensible event hierarchies match by assignability through the
        // observed type's closure; the closed built-in events match by
        // exact raw type only.
        if !self.process_annotated_type_observed.load(Ordering::Acquire)
            && observed.contains_raw(ClassId::of::<ProcessAnnotatedType>())
        {
            self.process_annotated_type_observed.store(true, Ordering::Release);
        } else if !self.process_bean_observed.load(Ordering::Acquire)
            && observed.contains_raw(ClassId::of::<ProcessBean>())
        {
            self.process_bean_observed.store(true, Ordering::Release);
        } else if !self.process_bean_attributes_observed.load(Ordering::Acquire)
            && observed.contains_raw(ClassId::of::<ProcessBeanAttributes>())
        {
            self.process_bean_attributes_observed.store(true, Ordering::Release);
        } else if !self.process_observer_method_observed.load(Ordering::Acquire)
            && observed.contains_raw(ClassId::of::<ProcessObserverMethod>())
        {
            self.process_observer_method_observed.store(true, Ordering::Release);
        } else if !self.process_producer_observed.load(Ordering::Acquire)
            && raw == ClassId::of::<ProcessProducer>()
        {
            self.process_producer_observed.store(true, Ordering::Release);
        } else if !self.process_injection_target_observed.load(Ordering::Acquire)
            && raw == ClassId::of::<ProcessInjectionTarget>()
        {
            self.process_injection_target_observed.store(true, Ordering::Release);
        } else if !self.process_injection_point_observed.load(Ordering::Acquire)
            && raw == ClassId::of::<ProcessInjectionPoint>()
        {
            self.process_injection_point_observed.store(true, Ordering::Release);
        }
    }

    fn everything(&self) -> bool {
        self.everything_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessAnnotatedType` has observers.
    pub fn is_process_annotated_type_observed(&self) -> bool {
        self.everything() || self.process_annotated_type_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessBean` has observers.
    pub fn is_process_bean_observed(&self) -> bool {
        self.everything() || self.process_bean_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessBeanAttributes` has observers.
    pub fn is_process_bean_attributes_observed(&self) -> bool {
        self.everything() || self.process_bean_attributes_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessInjectionPoint` has observers.
    pub fn is_process_injection_point_observed(&self) -> bool {
        self.everything() || self.process_injection_point_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessInjectionTarget` has observers.
    pub fn is_process_injection_target_observed(&self) -> bool {
        self.everything() || self.process_injection_target_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessProducer` has observers.
    pub fn is_process_producer_observed(&self) -> bool {
        self.everything() || self.process_producer_observed.load(Ordering::Acquire)
    }

    /// Whether `ProcessObserverMethod` has observers.
    pub fn is_process_observer_method_observed(&self) -> bool {
        self.everything() || self.process_observer_method_observed.load(Ordering::Acquire)
    }

    /// Bootstrap service hook; the tracker holds no external resources.
    pub fn cleanup(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::TypeRef;

    fn extension_observing(observed: TypeClosure) -> ObserverMethodInfo {
        ObserverMethodInfo::extension(observed, "test_ext.observe", |_| Ok(()))
    }

    #[test]
    fn starts_with_nothing_observed() {
        let tracker = LifecycleEventTracker::new();
        assert!(!tracker.is_process_annotated_type_observed());
        assert!(!tracker.is_process_bean_observed());
        assert!(!tracker.is_process_bean_attributes_observed());
        assert!(!tracker.is_process_injection_point_observed());
        assert!(!tracker.is_process_injection_target_observed());
        assert!(!tracker.is_process_producer_observed());
        assert!(!tracker.is_process_observer_method_observed());
    }

    #[test]
    fn universal_observer_implies_all_categories() {
        let tracker = LifecycleEventTracker::new();
        tracker.register_observer(&extension_observing(TypeClosure::of(TypeRef::universal())));
        assert!(tracker.is_process_annotated_type_observed());
        assert!(tracker.is_process_bean_observed());
        assert!(tracker.is_process_bean_attributes_observed());
        assert!(tracker.is_process_injection_point_observed());
        assert!(tracker.is_process_injection_target_observed());
        assert!(tracker.is_process_producer_observed());
        assert!(tracker.is_process_observer_method_observed());
    }

    #[test]
    fn subtype_of_extensible_category_matches() {
        // an extension-defined specialization of ProcessBean
        struct CustomBeanEvent;
        let observed = TypeClosure::from_types(
            TypeRef::of::<CustomBeanEvent>(),
            [TypeRef::of::<ProcessBean>()],
        );
        let tracker = LifecycleEventTracker::new();
        tracker.register_observer(&extension_observing(observed));
        assert!(tracker.is_process_bean_observed());
        assert!(!tracker.is_process_annotated_type_observed());
    }

    #[test]
    fn closed_categories_require_exact_type() {
        struct CustomProducerEvent;
        let observed = TypeClosure::from_types(
            TypeRef::of::<CustomProducerEvent>(),
            [TypeRef::of::<ProcessProducer>()],
        );
        let tracker = LifecycleEventTracker::new();
        tracker.register_observer(&extension_observing(observed));
        // subtype does not count for the closed built-in event
        assert!(!tracker.is_process_producer_observed());

        tracker.register_observer(&extension_observing(TypeClosure::of(
            TypeRef::of::<ProcessProducer>(),
        )));
        assert!(tracker.is_process_producer_observed());
    }

    #[test]
    fn application_observers_are_ignored() {
        let tracker = LifecycleEventTracker::new();
        tracker.register_observer(&ObserverMethodInfo::application(
            TypeClosure::of(TypeRef::of::<ProcessBean>()),
            "app.on_bean",
            |_| Ok(()),
        ));
        assert!(!tracker.is_process_bean_observed());
    }

    #[test]
    fn flags_are_monotonic() {
        let tracker = LifecycleEventTracker::new();
        tracker.register_observer(&extension_observing(TypeClosure::of(
            TypeRef::of::<ProcessBean>(),
        )));
        assert!(tracker.is_process_bean_observed());

        // further registrations of other categories never clear the flag
        tracker.register_observer(&extension_observing(TypeClosure::of(
            TypeRef::of::<ProcessInjectionPoint>(),
        )));
        assert!(tracker.is_process_bean_observed());
        assert!(tracker.is_process_injection_point_observed());
    }
}
