//! Tests for protected copy and clone.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use crate::protect::{Protector, ProtectorConfig, ProtectError};
    use crate::reflect::DynValue;

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct SimpleStruct {
            pub id: String => r#"protectfor:"create,update""#,
            pub code: String => r#"protectfor:"update""#,
            pub name: String,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Inner {
            pub id: String => r#"protectfor:"update""#,
            pub value: i64,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Outer {
            pub label: String,
            pub inner: Inner,
            pub parent: Option<Inner>,
            pub boxed: Box<Inner>,
            secret: String,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default)]
        pub struct Envelope {
            pub kind: String,
            pub payload: DynValue,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Audited {
            pub name: String,
            pub created_at: DateTime<Utc> => r#"protectfor:"update""#,
            pub updated_at: Option<DateTime<Utc>>,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Stamp {
            pub seconds: i64 => r#"protectfor:"update""#,
            pub zone: String,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Stamped {
            pub stamp: Stamp,
            pub stamps: Vec<Stamp>,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Opaque {
            pub id: String => r#"protectfor:"update""#,
            hidden: i64,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default)]
        pub struct Holder {
            pub list: Vec<Opaque> => r#"protectopt:"match""#,
            pub map: HashMap<String, Opaque> => r#"protectopt:"patch""#,
            pub payload: DynValue,
        }
    }

    crate::reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Guarded {
            pub id: String => r#"guard:"update""#,
            pub name: String => r#"protectfor:"update""#,
            pub tags: Vec<String> => r#"mode:"shorter""#,
        }
    }

    fn simple() -> SimpleStruct {
        SimpleStruct {
            id: "1".to_string(),
            code: "A".to_string(),
            name: "N".to_string(),
        }
    }

    fn inner(id: &str, value: i64) -> Inner {
        Inner {
            id: id.to_string(),
            value,
        }
    }

    fn time(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()
    }

    #[test]
    fn test_simple_struct_tags() {
        let protector = Protector::default();
        let cases = [
            ("create", SimpleStruct { id: "".into(), code: "A".into(), name: "N".into() }),
            ("update", SimpleStruct { id: "".into(), code: "".into(), name: "N".into() }),
            ("", simple()),
            ("delete", simple()),
        ];

        for (tag, expected) in cases {
            let mut dst = SimpleStruct::default();
            protector.copy(tag, &simple(), &mut dst).unwrap();
            assert_eq!(dst, expected, "tag {:?}", tag);
        }
    }

    #[test]
    fn test_excluded_fields_keep_destination_value() {
        let protector = Protector::default();
        let mut dst = SimpleStruct {
            id: "keep".into(),
            code: "keep".into(),
            name: "old".into(),
        };
        protector.copy("update", &simple(), &mut dst).unwrap();
        assert_eq!(dst.id, "keep");
        assert_eq!(dst.code, "keep");
        assert_eq!(dst.name, "N");
    }

    #[test]
    fn test_copy_with_empty_tag_is_idempotent() {
        let protector = Protector::default();
        let src = Outer {
            label: "outer".into(),
            inner: inner("i", 1),
            parent: Some(inner("p", 2)),
            boxed: Box::new(inner("b", 3)),
            secret: "hidden".into(),
        };

        let mut once = Outer::default();
        protector.copy("", &src, &mut once).unwrap();
        let mut twice = once.clone();
        protector.copy("", &src, &mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_exclusions_and_private_fields() {
        let protector = Protector::default();
        let src = Outer {
            label: "new".into(),
            inner: inner("src", 10),
            parent: None,
            boxed: Box::new(inner("src-box", 20)),
            secret: "src-secret".into(),
        };
        let mut dst = Outer {
            label: "old".into(),
            inner: inner("dst", 1),
            parent: None,
            boxed: Box::new(inner("dst-box", 2)),
            secret: "dst-secret".into(),
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.label, "new");
        assert_eq!(dst.inner, inner("dst", 10));
        assert_eq!(*dst.boxed, inner("dst-box", 20));
        assert_eq!(dst.secret, "dst-secret");
    }

    #[test]
    fn test_nil_source_pointer_forces_nil() {
        let protector = Protector::default();
        let src = Outer::default();
        let mut dst = Outer {
            parent: Some(inner("p", 7)),
            ..Outer::default()
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.parent, None);
    }

    #[test]
    fn test_pointer_target_allocated_with_exclusions() {
        let protector = Protector::default();
        let src = Outer {
            parent: Some(inner("p", 7)),
            ..Outer::default()
        };
        let mut dst = Outer::default();

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.parent, Some(inner("", 7)));

        protector.copy("create", &src, &mut dst).unwrap();
        assert_eq!(dst.parent, Some(inner("p", 7)));
    }

    #[test]
    fn test_dynamic_value_is_rebuilt() {
        let protector = Protector::default();
        let src = Envelope {
            kind: "inner".into(),
            payload: DynValue::new(inner("src", 5)),
        };
        let mut dst = Envelope {
            kind: "old".into(),
            payload: DynValue::new(inner("dst", 1)),
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.payload.downcast_ref::<Inner>(), Some(&inner("", 5)));

        dst.payload = DynValue::new("text".to_string());
        protector.copy("", &src, &mut dst).unwrap();
        assert_eq!(dst.payload.downcast_ref::<Inner>(), Some(&inner("src", 5)));

        protector.copy("", &Envelope::default(), &mut dst).unwrap();
        assert!(dst.payload.is_empty());
    }

    #[test]
    fn test_time_fields() {
        let protector = Protector::default();
        let src = Audited {
            name: "new".into(),
            created_at: time(2_000),
            updated_at: Some(time(3_000)),
        };
        let mut dst = Audited {
            name: "old".into(),
            created_at: time(1_000),
            updated_at: None,
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.created_at, time(1_000));
        assert_eq!(dst.updated_at, Some(time(3_000)));

        protector.copy("create", &src, &mut dst).unwrap();
        assert_eq!(dst, src);
        assert!(protector.is_primitive::<DateTime<Utc>>());
    }

    #[test]
    fn test_registered_primitive_is_copied_whole() {
        let protector = Protector::default();
        let src = Stamped {
            stamp: Stamp { seconds: 42, zone: "UTC".into() },
            stamps: vec![Stamp { seconds: 7, zone: "JST".into() }],
        };

        let mut dst = Stamped::default();
        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.stamp, Stamp { seconds: 0, zone: "UTC".into() });

        assert!(!protector.is_primitive::<Stamp>());
        protector.register_primitive::<Stamp>();
        assert!(protector.is_primitive::<Stamp>());

        let mut dst = Stamped::default();
        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_primitive_checked_at_every_entry_point() {
        let opaque = |id: &str, hidden: i64| Opaque {
            id: id.to_string(),
            hidden,
        };
        let protector = Protector::default();
        protector.register_primitive::<Opaque>();

        let src = Holder {
            list: vec![opaque("s", 9), opaque("t", 8)],
            map: HashMap::from([("k".to_string(), opaque("s", 9)), ("n".to_string(), opaque("t", 8))]),
            payload: DynValue::new(opaque("s", 9)),
        };
        let mut dst = Holder {
            list: vec![opaque("d", 1)],
            map: HashMap::from([("k".to_string(), opaque("d", 1)), ("z".to_string(), opaque("z", 2))]),
            payload: DynValue::new(opaque("d", 1)),
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.list, vec![opaque("s", 9), opaque("t", 8)]);
        assert_eq!(
            dst.map,
            HashMap::from([
                ("k".to_string(), opaque("s", 9)),
                ("n".to_string(), opaque("t", 8)),
                ("z".to_string(), opaque("z", 2)),
            ])
        );
        assert_eq!(dst.payload.downcast_ref::<Opaque>(), Some(&opaque("s", 9)));

        let cloned = protector.clone(&src).unwrap();
        assert_eq!(cloned.list, src.list);
        assert_eq!(cloned.map, src.map);
        assert_eq!(cloned.payload.downcast_ref::<Opaque>(), Some(&opaque("s", 9)));
    }

    #[test]
    fn test_unregistered_struct_is_copied_field_by_field() {
        let protector = Protector::default();
        let src = Holder {
            list: vec![Opaque {
                id: "s".into(),
                hidden: 9,
            }],
            ..Holder::default()
        };
        let mut dst = Holder::default();

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.list, vec![Opaque::default()]);
    }

    #[test]
    fn test_primitive_registry_is_per_protector() {
        let first = Protector::default();
        let second = Protector::default();
        first.register_primitive::<Stamp>();
        assert!(first.is_primitive::<Stamp>());
        assert!(!second.is_primitive::<Stamp>());
    }

    #[test]
    fn test_clone_ignores_tags() {
        let protector = Protector::default();
        let src = Outer {
            label: "outer".into(),
            inner: inner("i", 1),
            parent: Some(inner("p", 2)),
            boxed: Box::new(inner("b", 3)),
            secret: "hidden".into(),
        };

        let mut cloned = protector.clone(&src).unwrap();
        assert_eq!(cloned.inner, src.inner);
        assert_eq!(cloned.parent, src.parent);
        assert_eq!(cloned.boxed, src.boxed);
        assert_eq!(cloned.secret, "");

        cloned.parent.as_mut().unwrap().value = 99;
        assert_eq!(src.parent.as_ref().map(|p| p.value), Some(2));
    }

    #[test]
    fn test_clone_of_none_is_none() {
        let protector = Protector::default();
        let cloned = protector.clone(&None::<SimpleStruct>).unwrap();
        assert_eq!(cloned, None);

        let boxed = protector.clone_dyn(&simple()).unwrap();
        assert_eq!(boxed.downcast_ref::<SimpleStruct>(), Some(&simple()));
    }

    #[test]
    fn test_copy_dereferences_nilable_operands() {
        let protector = Protector::default();

        let mut dst = SimpleStruct::default();
        protector.copy("", &Some(simple()), &mut dst).unwrap();
        assert_eq!(dst, simple());

        let mut dst = Some(SimpleStruct::default());
        protector.copy("update", &simple(), &mut dst).unwrap();
        assert_eq!(dst.map(|d| d.name), Some("N".to_string()));
    }

    #[test]
    fn test_copy_rejects_nil_operands() {
        let protector = Protector::default();

        let mut dst = SimpleStruct::default();
        let err = protector.copy("", &None::<SimpleStruct>, &mut dst).unwrap_err();
        assert!(matches!(err, ProtectError::InvalidArgument { .. }), "{}", err);

        let mut dst: Option<SimpleStruct> = None;
        let err = protector.copy("", &simple(), &mut dst).unwrap_err();
        assert!(matches!(err, ProtectError::InvalidArgument { .. }), "{}", err);
    }

    #[test]
    fn test_copy_rejects_different_types() {
        let protector = Protector::default();
        let mut dst = Outer::default();
        let err = protector.copy("", &simple(), &mut dst).unwrap_err();
        assert!(matches!(err, ProtectError::TypeMismatch { .. }), "{}", err);

        let mut dst = Some(Outer::default());
        let err = protector.copy("", &Some(simple()), &mut dst).unwrap_err();
        assert!(matches!(err, ProtectError::TypeMismatch { .. }), "{}", err);
    }

    #[test]
    fn test_custom_tag_names() {
        let protector = Protector::from_config(&ProtectorConfig::new("guard", "mode"));
        assert_eq!(protector.tag_name(), "guard");
        assert_eq!(protector.option_tag_name(), "mode");

        let src = Guarded {
            id: "1".into(),
            name: "new".into(),
            tags: vec!["a".into(), "b".into()],
        };
        let mut dst = Guarded {
            id: "keep".into(),
            name: "old".into(),
            tags: vec!["x".into()],
        };

        protector.copy("update", &src, &mut dst).unwrap();
        assert_eq!(dst.id, "keep");
        assert_eq!(dst.name, "new");
        assert_eq!(dst.tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_protector_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Protector>();

        let protector = std::sync::Arc::new(Protector::default());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let protector = std::sync::Arc::clone(&protector);
                std::thread::spawn(move || {
                    let src = SimpleStruct {
                        name: format!("worker-{}", worker),
                        ..simple()
                    };
                    let mut dst = SimpleStruct::default();
                    protector.copy("create", &src, &mut dst).unwrap();
                    dst
                })
            })
            .collect();

        for (worker, handle) in handles.into_iter().enumerate() {
            let dst = handle.join().unwrap();
            assert_eq!(dst.id, "");
            assert_eq!(dst.name, format!("worker-{}", worker));
        }
    }

    #[test]
    fn test_crate_level_functions() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let mut dst = SimpleStruct::default();
        crate::copy("create", &simple(), &mut dst).unwrap();
        assert_eq!(dst.id, "");
        assert_eq!(dst.code, "A");

        let cloned = crate::clone(&simple()).unwrap();
        assert_eq!(cloned, simple());
    }
}
