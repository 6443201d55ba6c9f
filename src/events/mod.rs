//! Container lifecycle event subsystem.
//!
//! Extensions participate in bootstrap by observing lifecycle events fired
//! while the container builds its bean definitions. Firing an event is
//! expensive (wrapper construction, metadata snapshots), so a per-container
//! [`LifecycleEventTracker`] records which of the seven categories actually
//! have extension observers and every fire operation short-circuits to a
//! no-op when its category is unobserved.

mod dispatch;
mod tracker;
mod types;

pub use dispatch::ContainerLifecycleEvents;
pub use tracker::LifecycleEventTracker;
pub use types::{
    Bean, BeanAttributes, BeanKind, InjectionPointInfo, InjectionTarget, LifecycleEvent,
    ObserverCallback, ObserverMethodInfo, ProcessAnnotatedType, ProcessBean,
    ProcessBeanAttributes, ProcessInjectionPoint, ProcessInjectionTarget, ProcessObserverMethod,
    ProcessProducer, Producer,
};
