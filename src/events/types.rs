//! Lifecycle event payloads and the seven event categories.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::annotated::EnhancedType;
use crate::error::CdiResult;
use crate::reflect::{AnnotationRef, ClassId, Instance, TypeRef};
use crate::types::TypeClosure;

/// Implementation kind of a bean.
///
/// The set of kinds is closed and known at design time; firing a bean event
/// selects the event flavor by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeanKind {
    /// Class bean managed directly by the container
    Managed,
    /// Session bean hosted by the component runtime
    Session,
    /// Bean produced by a producer method
    ProducerMethod,
    /// Bean produced by a producer field
    ProducerField,
    /// Bean registered programmatically by an extension
    Synthetic,
}

/// Attribute snapshot of a bean, as extensions see and may replace it.
#[derive(Debug, Clone)]
pub struct BeanAttributes {
    /// Bean types the bean is resolvable by
    pub types: BTreeSet<TypeRef>,
    /// Qualifier annotations
    pub qualifiers: Vec<AnnotationRef>,
    /// Scope annotation type, when scoped
    pub scope: Option<TypeRef>,
    /// EL name, when named
    pub name: Option<String>,
    /// Whether the bean is an alternative
    pub alternative: bool,
}

/// A bean definition as seen by the event layer.
///
/// `attributes()` captures the metadata snapshot carried by bean events.
/// The snapshot is expensive; the dispatcher only calls it when the event
/// category actually has observers.
pub trait Bean: Send + Sync {
    /// Implementation kind, selecting the event flavor.
    fn kind(&self) -> BeanKind;

    /// Captures the attribute snapshot.
    fn attributes(&self) -> BeanAttributes;

    /// Label of the producer member for producer-method and producer-field
    /// beans.
    fn producer_member(&self) -> Option<String> {
        None
    }
}

/// A location where the container supplies a dependency.
#[derive(Debug, Clone)]
pub struct InjectionPointInfo {
    /// Required type at the injection point
    pub required_type: TypeRef,
    /// Qualifier annotations at the injection point
    pub qualifiers: Vec<AnnotationRef>,
    /// Declaring component class
    pub declaring_class: TypeRef,
    /// Diagnostic label of the injected member (field or parameter)
    pub member: String,
}

/// Produce/inject/dispose lifecycle operations for a class bean instance.
///
/// Opaque to the event layer; extensions may wrap or replace it via
/// `ProcessInjectionTarget`.
pub trait InjectionTarget: Send + Sync {
    /// Instantiates the bean class.
    fn produce(&self) -> CdiResult<Instance>;

    /// Performs field and initializer injection on `instance`.
    fn inject(&self, instance: &Instance) -> CdiResult<()>;

    /// Runs post-construct callbacks.
    fn post_construct(&self, instance: &Instance) -> CdiResult<()>;

    /// Runs pre-destroy callbacks.
    fn pre_destroy(&self, instance: &Instance) -> CdiResult<()>;
}

/// Produce/dispose operations backing a producer bean.
pub trait Producer: Send + Sync {
    /// Produces an instance.
    fn produce(&self) -> CdiResult<Instance>;

    /// Disposes a produced instance.
    fn dispose(&self, product: Instance);
}

/// Callback notified when a lifecycle event is delivered to an observer.
///
/// A returned error is fatal to the bootstrap phase firing the event.
pub type ObserverCallback =
    Arc<dyn Fn(&mut LifecycleEvent<'_>) -> Result<(), String> + Send + Sync>;

/// An observer method discovered at bootstrap.
///
/// Carries the observed event type (with its type closure, so category
/// matching can use assignability), whether the observer is backed by an
/// extension, and the notification callback.
pub struct ObserverMethodInfo {
    observed: TypeClosure,
    extension_backed: bool,
    label: String,
    notify: ObserverCallback,
}

impl ObserverMethodInfo {
    /// Creates an extension-backed observer method.
    pub fn extension<F>(observed: TypeClosure, label: impl Into<String>, notify: F) -> Self
    where
        F: Fn(&mut LifecycleEvent<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            observed,
            extension_backed: true,
            label: label.into(),
            notify: Arc::new(notify),
        }
    }

    /// Creates an application observer method; these never count for
    /// container lifecycle event gating.
    pub fn application<F>(observed: TypeClosure, label: impl Into<String>, notify: F) -> Self
    where
        F: Fn(&mut LifecycleEvent<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            observed,
            extension_backed: false,
            label: label.into(),
            notify: Arc::new(notify),
        }
    }

    /// The observed event type.
    pub fn observed_type(&self) -> &TypeRef {
        self.observed.base()
    }

    /// Closure of the observed event type.
    pub fn observed_closure(&self) -> &TypeClosure {
        &self.observed
    }

    /// Whether this observer is backed by an extension.
    pub fn is_extension_backed(&self) -> bool {
        self.extension_backed
    }

    /// Diagnostic label (extension and method name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether a fired event of the given concrete type is delivered to
    /// this observer.
    pub(crate) fn observes(&self, event_type: ClassId) -> bool {
        let raw = self.observed.base().raw();
        raw.is_universal() || raw == event_type
    }

    pub(crate) fn deliver(&self, event: &mut LifecycleEvent<'_>) -> Result<(), String> {
        (self.notify)(event)
    }
}

impl fmt::Debug for ObserverMethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverMethodInfo")
            .field("observed", self.observed.base())
            .field("extension_backed", &self.extension_backed)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Event fired for every annotated type discovered on the classpath.
///
/// Mutable: extensions may replace the annotated type or veto it entirely.
#[derive(Debug)]
pub struct ProcessAnnotatedType {
    annotated_type: Arc<EnhancedType>,
    vetoed: bool,
}

impl ProcessAnnotatedType {
    pub(crate) fn new(annotated_type: Arc<EnhancedType>) -> Self {
        Self { annotated_type, vetoed: false }
    }

    /// The annotated type under processing.
    pub fn annotated_type(&self) -> &Arc<EnhancedType> {
        &self.annotated_type
    }

    /// Replaces the annotated type the container will use.
    pub fn set_annotated_type(&mut self, annotated_type: Arc<EnhancedType>) {
        self.annotated_type = annotated_type;
    }

    /// Requests that the container ignore this type entirely.
    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    /// Whether the type has been vetoed.
    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }

    pub(crate) fn into_annotated_type(self) -> Arc<EnhancedType> {
        self.annotated_type
    }
}

/// Event fired for every bean registered with the container.
///
/// The flavor is selected from the bean's [`BeanKind`]; producer kinds
/// additionally carry the producer member label.
#[derive(Debug)]
pub struct ProcessBean {
    kind: BeanKind,
    attributes: BeanAttributes,
    producer_member: Option<String>,
}

impl ProcessBean {
    pub(crate) fn of(bean: &dyn Bean) -> Self {
        let kind = bean.kind();
        // the snapshot is the expensive part; callers gate on observation
        let attributes = bean.attributes();
        let producer_member = match kind {
            BeanKind::ProducerMethod | BeanKind::ProducerField => bean.producer_member(),
            _ => None,
        };
        Self { kind, attributes, producer_member }
    }

    /// Implementation kind of the bean.
    pub fn kind(&self) -> BeanKind {
        self.kind
    }

    /// Attribute snapshot captured when the event was constructed.
    pub fn attributes(&self) -> &BeanAttributes {
        &self.attributes
    }

    /// Producer member label, for producer-method and producer-field beans.
    pub fn producer_member(&self) -> Option<&str> {
        self.producer_member.as_deref()
    }
}

/// Event fired before a bean's attributes are committed.
///
/// Mutable: extensions may replace the attributes or veto the bean.
#[derive(Debug)]
pub struct ProcessBeanAttributes {
    attributes: BeanAttributes,
    vetoed: bool,
}

impl ProcessBeanAttributes {
    pub(crate) fn new(attributes: BeanAttributes) -> Self {
        Self { attributes, vetoed: false }
    }

    /// The attributes under processing.
    pub fn attributes(&self) -> &BeanAttributes {
        &self.attributes
    }

    /// Replaces the attributes the container will commit.
    pub fn set_attributes(&mut self, attributes: BeanAttributes) {
        self.attributes = attributes;
    }

    /// Requests that the bean not be registered.
    pub fn veto(&mut self) {
        self.vetoed = true;
    }

    /// Whether the bean has been vetoed.
    pub fn is_vetoed(&self) -> bool {
        self.vetoed
    }

    pub(crate) fn into_attributes(self) -> BeanAttributes {
        self.attributes
    }
}

/// Event fired for every injection point of every bean.
///
/// Mutable: extensions may replace the injection point metadata.
#[derive(Debug)]
pub struct ProcessInjectionPoint {
    injection_point: InjectionPointInfo,
}

impl ProcessInjectionPoint {
    pub(crate) fn new(injection_point: InjectionPointInfo) -> Self {
        Self { injection_point }
    }

    /// The injection point under processing.
    pub fn injection_point(&self) -> &InjectionPointInfo {
        &self.injection_point
    }

    /// Replaces the injection point the container will use.
    pub fn set_injection_point(&mut self, injection_point: InjectionPointInfo) {
        self.injection_point = injection_point;
    }

    pub(crate) fn into_injection_point(self) -> InjectionPointInfo {
        self.injection_point
    }
}

/// Event fired for the injection target of every class bean.
///
/// Mutable: extensions may wrap or replace the injection target.
pub struct ProcessInjectionTarget {
    annotated_type: Arc<EnhancedType>,
    injection_target: Arc<dyn InjectionTarget>,
}

impl ProcessInjectionTarget {
    pub(crate) fn new(
        annotated_type: Arc<EnhancedType>,
        injection_target: Arc<dyn InjectionTarget>,
    ) -> Self {
        Self { annotated_type, injection_target }
    }

    /// The annotated type the injection target instantiates.
    pub fn annotated_type(&self) -> &Arc<EnhancedType> {
        &self.annotated_type
    }

    /// The injection target under processing.
    pub fn injection_target(&self) -> &Arc<dyn InjectionTarget> {
        &self.injection_target
    }

    /// Replaces the injection target the container will use.
    pub fn set_injection_target(&mut self, injection_target: Arc<dyn InjectionTarget>) {
        self.injection_target = injection_target;
    }

    pub(crate) fn into_injection_target(self) -> Arc<dyn InjectionTarget> {
        self.injection_target
    }
}

impl fmt::Debug for ProcessInjectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessInjectionTarget")
            .field("annotated_type", &self.annotated_type.name())
            .finish_non_exhaustive()
    }
}

/// Event fired for every producer method and producer field.
///
/// Mutable: extensions may wrap or replace the producer.
pub struct ProcessProducer {
    member: String,
    producer: Arc<dyn Producer>,
}

impl ProcessProducer {
    pub(crate) fn new(member: String, producer: Arc<dyn Producer>) -> Self {
        Self { member, producer }
    }

    /// Label of the producer member.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The producer under processing.
    pub fn producer(&self) -> &Arc<dyn Producer> {
        &self.producer
    }

    /// Replaces the producer the container will use.
    pub fn set_producer(&mut self, producer: Arc<dyn Producer>) {
        self.producer = producer;
    }

    pub(crate) fn into_producer(self) -> Arc<dyn Producer> {
        self.producer
    }
}

impl fmt::Debug for ProcessProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessProducer")
            .field("member", &self.member)
            .finish_non_exhaustive()
    }
}

/// Event fired for every observer method discovered at bootstrap.
#[derive(Debug)]
pub struct ProcessObserverMethod {
    observer: Arc<ObserverMethodInfo>,
}

impl ProcessObserverMethod {
    pub(crate) fn new(observer: Arc<ObserverMethodInfo>) -> Self {
        Self { observer }
    }

    /// The observer method under processing.
    pub fn observer(&self) -> &Arc<ObserverMethodInfo> {
        &self.observer
    }
}

/// A lifecycle event as delivered to an observer callback.
///
/// Tagged-variant dispatch over the seven categories; mutable kinds carry
/// mutable references so extensions can replace payloads in place.
#[derive(Debug)]
pub enum LifecycleEvent<'a> {
    /// `ProcessAnnotatedType`
    AnnotatedType(&'a mut ProcessAnnotatedType),
    /// `ProcessBean`
    Bean(&'a ProcessBean),
    /// `ProcessBeanAttributes`
    BeanAttributes(&'a mut ProcessBeanAttributes),
    /// `ProcessInjectionPoint`
    InjectionPoint(&'a mut ProcessInjectionPoint),
    /// `ProcessInjectionTarget`
    InjectionTarget(&'a mut ProcessInjectionTarget),
    /// `ProcessProducer`
    Producer(&'a mut ProcessProducer),
    /// `ProcessObserverMethod`
    ObserverMethod(&'a ProcessObserverMethod),
}

impl LifecycleEvent<'_> {
    /// Concrete event type identity, used for delivery matching.
    pub fn event_type(&self) -> ClassId {
        match self {
            LifecycleEvent::AnnotatedType(_) => ClassId::of::<ProcessAnnotatedType>(),
            LifecycleEvent::Bean(_) => ClassId::of::<ProcessBean>(),
            LifecycleEvent::BeanAttributes(_) => ClassId::of::<ProcessBeanAttributes>(),
            LifecycleEvent::InjectionPoint(_) => ClassId::of::<ProcessInjectionPoint>(),
            LifecycleEvent::InjectionTarget(_) => ClassId::of::<ProcessInjectionTarget>(),
            LifecycleEvent::Producer(_) => ClassId::of::<ProcessProducer>(),
            LifecycleEvent::ObserverMethod(_) => ClassId::of::<ProcessObserverMethod>(),
        }
    }

    /// Category name for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            LifecycleEvent::AnnotatedType(_) => "ProcessAnnotatedType",
            LifecycleEvent::Bean(_) => "ProcessBean",
            LifecycleEvent::BeanAttributes(_) => "ProcessBeanAttributes",
            LifecycleEvent::InjectionPoint(_) => "ProcessInjectionPoint",
            LifecycleEvent::InjectionTarget(_) => "ProcessInjectionTarget",
            LifecycleEvent::Producer(_) => "ProcessProducer",
            LifecycleEvent::ObserverMethod(_) => "ProcessObserverMethod",
        }
    }
}
