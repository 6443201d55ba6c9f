#![no_main]

use std::collections::BTreeSet;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;

use canister::annotated::EnhancedType;
use canister::events::{
    Bean, BeanAttributes, BeanKind, ContainerLifecycleEvents, LifecycleEvent, ObserverMethodInfo,
    ProcessAnnotatedType, ProcessBean, ProcessBeanAttributes,
};
use canister::reflect::{TypeHierarchy, TypeRef};
use canister::TypeClosure;

struct FlatHierarchy;

impl TypeHierarchy for FlatHierarchy {
    fn direct_supertypes(&self, _: &TypeRef) -> Vec<TypeRef> {
        Vec::new()
    }
}

struct Component;

struct PlainBean;

impl Bean for PlainBean {
    fn kind(&self) -> BeanKind {
        BeanKind::Managed
    }

    fn attributes(&self) -> BeanAttributes {
        BeanAttributes {
            types: BTreeSet::from([TypeRef::of::<Component>()]),
            qualifiers: Vec::new(),
            scope: None,
            name: None,
            alternative: false,
        }
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let registrations = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let fires = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    let mut events = ContainerLifecycleEvents::new();

    // register a byte-selected mix of observers
    for shift in 0..8 {
        match (registrations >> (shift * 4)) % 5 {
            0 => {}
            1 => events.register_observer(ObserverMethodInfo::extension(
                TypeClosure::of(TypeRef::of::<ProcessAnnotatedType>()),
                "fuzz.on_type",
                |event| {
                    if let LifecycleEvent::AnnotatedType(pat) = event {
                        if pat.annotated_type().name().is_empty() {
                            pat.veto();
                        }
                    }
                    Ok(())
                },
            )),
            2 => events.register_observer(ObserverMethodInfo::extension(
                TypeClosure::of(TypeRef::of::<ProcessBean>()),
                "fuzz.on_bean",
                |_| Ok(()),
            )),
            3 => events.register_observer(ObserverMethodInfo::extension(
                TypeClosure::of(TypeRef::of::<ProcessBeanAttributes>()),
                "fuzz.rename",
                |event| {
                    if let LifecycleEvent::BeanAttributes(pba) = event {
                        let mut attributes = pba.attributes().clone();
                        attributes.name = Some("renamed".to_string());
                        pba.set_attributes(attributes);
                    }
                    Ok(())
                },
            )),
            // application observers never participate in gating
            _ => events.register_observer(ObserverMethodInfo::application(
                TypeClosure::of(TypeRef::of::<ProcessBean>()),
                "fuzz.app",
                |_| Ok(()),
            )),
        }
    }

    let tracker_snapshot = (
        events.tracker().is_process_annotated_type_observed(),
        events.tracker().is_process_bean_observed(),
        events.tracker().is_process_bean_attributes_observed(),
    );

    for shift in 0..8 {
        match (fires >> (shift * 4)) % 3 {
            0 => {
                let annotated = EnhancedType::new(
                    TypeRef::of::<Component>(),
                    Vec::new(),
                    Vec::new(),
                    Arc::new(FlatHierarchy),
                );
                let kept = events.fire_process_annotated_type(annotated.clone()).unwrap();
                // the observer above never vetoes a named type
                let kept = kept.unwrap();
                if !tracker_snapshot.0 {
                    assert!(Arc::ptr_eq(&kept, &annotated));
                }
            }
            1 => {
                events.fire_process_bean(&PlainBean).unwrap();
            }
            _ => {
                let attributes = PlainBean.attributes();
                let committed = events.fire_process_bean_attributes(attributes).unwrap().unwrap();
                if tracker_snapshot.2 {
                    assert_eq!(committed.name.as_deref(), Some("renamed"));
                } else {
                    assert_eq!(committed.name, None);
                }
            }
        }
    }

    // registration never clears a flag
    assert_eq!(
        tracker_snapshot,
        (
            events.tracker().is_process_annotated_type_observed(),
            events.tracker().is_process_bean_observed(),
            events.tracker().is_process_bean_attributes_observed(),
        )
    );
});
