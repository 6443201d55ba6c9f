//! Lifecycle event firing.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::annotated::EnhancedType;
use crate::error::{CdiError, CdiResult};

use super::tracker::LifecycleEventTracker;
use super::types::{
    Bean, BeanAttributes, InjectionPointInfo, InjectionTarget, LifecycleEvent, ObserverMethodInfo,
    ProcessAnnotatedType, ProcessBean, ProcessBeanAttributes, ProcessInjectionPoint,
    ProcessInjectionTarget, ProcessObserverMethod, ProcessProducer, Producer,
};

/// Fires container lifecycle events against registered extension observers.
///
/// Every `fire_process_*` entry point first consults the tracker; when a
/// category has no observers the call returns its input unchanged without
/// constructing an event object, so the metadata snapshots events capture
/// are never taken for nothing.
///
/// Mutable event kinds (`ProcessAnnotatedType`, `ProcessBeanAttributes`,
/// `ProcessInjectionPoint`, `ProcessInjectionTarget`, `ProcessProducer`)
/// return the possibly extension-replaced payload; callers must use the
/// returned value from that point forward.
///
/// An observer error aborts the phase: remaining observers are skipped and
/// the failure propagates as [`CdiError::ObserverFailure`], which is fatal
/// to container initialization.
#[derive(Debug, Default)]
pub struct ContainerLifecycleEvents {
    tracker: LifecycleEventTracker,
    observers: Vec<Arc<ObserverMethodInfo>>,
}

impl ContainerLifecycleEvents {
    /// Creates a dispatcher with no registered observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The observation tracker gating every fire operation.
    pub fn tracker(&self) -> &LifecycleEventTracker {
        &self.tracker
    }

    /// Registration hook, invoked once per discovered observer method at
    /// bootstrap time.
    ///
    /// Updates the tracker and retains extension-backed observers for
    /// delivery. Application observers never receive container lifecycle
    /// events and are dropped here.
    pub fn register_observer(&mut self, observer: ObserverMethodInfo) {
        self.tracker.register_observer(&observer);
        if observer.is_extension_backed() {
            trace!(observer = observer.label(), observed = %observer.observed_type(), "registered lifecycle observer");
            self.observers.push(Arc::new(observer));
        }
    }

    /// Delivers `event` to every matching observer in registration order.
    fn notify(&self, mut event: LifecycleEvent<'_>) -> CdiResult<()> {
        let event_type = event.event_type();
        let category = event.category();
        debug!(event = category, "firing lifecycle event");
        for observer in &self.observers {
            if observer.observes(event_type) {
                observer.deliver(&mut event).map_err(|message| CdiError::ObserverFailure {
                    event: category,
                    observer: observer.label().to_string(),
                    message,
                })?;
            }
        }
        Ok(())
    }

    /// Fires `ProcessAnnotatedType` for a discovered type.
    ///
    /// Returns the annotated type the container must use from now on, or
    /// `None` when an extension vetoed the type. Unobserved: the input is
    /// returned unchanged.
    pub fn fire_process_annotated_type(
        &self,
        annotated_type: Arc<EnhancedType>,
    ) -> CdiResult<Option<Arc<EnhancedType>>> {
        if !self.tracker.is_process_annotated_type_observed() {
            return Ok(Some(annotated_type));
        }
        let mut event = ProcessAnnotatedType::new(annotated_type);
        self.notify(LifecycleEvent::AnnotatedType(&mut event))?;
        if event.is_vetoed() {
            debug!("annotated type vetoed by extension");
            return Ok(None);
        }
        Ok(Some(event.into_annotated_type()))
    }

    /// Fires `ProcessBean` for a registered bean.
    ///
    /// The event flavor is selected from the bean's kind. Unobserved: no
    /// event is constructed and the bean's attribute snapshot is never
    /// taken.
    pub fn fire_process_bean(&self, bean: &dyn Bean) -> CdiResult<()> {
        if !self.tracker.is_process_bean_observed() {
            return Ok(());
        }
        let event = ProcessBean::of(bean);
        self.notify(LifecycleEvent::Bean(&event))
    }

    /// Fires `ProcessBeanAttributes` before attributes are committed.
    ///
    /// Returns the attributes the container must commit, or `None` when an
    /// extension vetoed the bean. Unobserved: the input is returned
    /// unchanged.
    pub fn fire_process_bean_attributes(
        &self,
        attributes: BeanAttributes,
    ) -> CdiResult<Option<BeanAttributes>> {
        if !self.tracker.is_process_bean_attributes_observed() {
            return Ok(Some(attributes));
        }
        let mut event = ProcessBeanAttributes::new(attributes);
        self.notify(LifecycleEvent::BeanAttributes(&mut event))?;
        if event.is_vetoed() {
            debug!("bean attributes vetoed by extension");
            return Ok(None);
        }
        Ok(Some(event.into_attributes()))
    }

    /// Fires `ProcessInjectionPoint` for a discovered injection point.
    ///
    /// Returns the injection point the container must use from now on.
    /// Unobserved: the input is returned unchanged.
    pub fn fire_process_injection_point(
        &self,
        injection_point: InjectionPointInfo,
    ) -> CdiResult<InjectionPointInfo> {
        if !self.tracker.is_process_injection_point_observed() {
            return Ok(injection_point);
        }
        let mut event = ProcessInjectionPoint::new(injection_point);
        self.notify(LifecycleEvent::InjectionPoint(&mut event))?;
        Ok(event.into_injection_point())
    }

    /// Fires `ProcessInjectionTarget` for a class bean's injection target.
    ///
    /// Returns the injection target the container must use from now on.
    /// Unobserved: the input is returned unchanged.
    pub fn fire_process_injection_target(
        &self,
        annotated_type: Arc<EnhancedType>,
        injection_target: Arc<dyn InjectionTarget>,
    ) -> CdiResult<Arc<dyn InjectionTarget>> {
        if !self.tracker.is_process_injection_target_observed() {
            return Ok(injection_target);
        }
        let mut event = ProcessInjectionTarget::new(annotated_type, injection_target);
        self.notify(LifecycleEvent::InjectionTarget(&mut event))?;
        Ok(event.into_injection_target())
    }

    /// Fires `ProcessProducer` for a producer method or field.
    ///
    /// Returns the producer the container must use from now on.
    /// Unobserved: the input is returned unchanged.
    pub fn fire_process_producer(
        &self,
        member: String,
        producer: Arc<dyn Producer>,
    ) -> CdiResult<Arc<dyn Producer>> {
        if !self.tracker.is_process_producer_observed() {
            return Ok(producer);
        }
        let mut event = ProcessProducer::new(member, producer);
        self.notify(LifecycleEvent::Producer(&mut event))?;
        Ok(event.into_producer())
    }

    /// Fires `ProcessObserverMethod` for a discovered observer method.
    ///
    /// Unobserved: no event is constructed.
    pub fn fire_process_observer_method(
        &self,
        observer: Arc<ObserverMethodInfo>,
    ) -> CdiResult<()> {
        if !self.tracker.is_process_observer_method_observed() {
            return Ok(());
        }
        let event = ProcessObserverMethod::new(observer);
        self.notify(LifecycleEvent::ObserverMethod(&event))
    }

    /// Bootstrap service hook; no external resources are held.
    pub fn cleanup(&self) {}
}
