//! Behavioral tests for stores across the context tree.

#[cfg(test)]
mod tests {
    use crate::context::{ContextBuilder, ExtensionContext};
    use crate::namespace::Namespace;
    use crate::report::NoOpReportSink;
    use crate::store::StoredValue;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    struct SharedKey;
    struct DifferentKey;

    fn root() -> Arc<ExtensionContext> {
        ContextBuilder::new("[engine:e]", "engine", "Engine")
            .with_report_sink(Arc::new(NoOpReportSink))
            .build()
            .unwrap()
    }

    fn text(value: Option<StoredValue>) -> Option<String> {
        value.and_then(|v| v.downcast_ref::<&str>().map(|s| (*s).to_string()))
    }

    #[test]
    fn test_local_write_isolation() {
        let parent = root();
        let child = parent.child("[engine:e]/[class:C]", "C", "C").unwrap();
        let ns = Namespace::single("isolation");

        child.store(&ns).put("k", StoredValue::new("v"));

        assert!(parent.store(&ns).get("k").is_none());
        assert_eq!(text(child.store(&ns).get("k")), Some("v".to_string()));
    }

    #[test]
    fn test_ancestor_fallback() {
        let parent = root();
        let ns = Namespace::single("fallback");
        parent.store(&ns).put("k", StoredValue::new("v"));

        let child = parent.child("[engine:e]/[class:C]", "C", "C").unwrap();

        assert_eq!(text(child.store(&ns).get("k")), Some("v".to_string()));
        assert!(!child.store(&ns).contains_local("k"));
    }

    #[test]
    fn test_fallback_respects_namespace() {
        let parent = root();
        parent.store(&Namespace::single("one")).put("k", StoredValue::new("v"));
        let child = parent.child("[engine:e]/[class:C]", "C", "C").unwrap();

        assert!(child.store(&Namespace::single("two")).get("k").is_none());
        assert!(child.default_store().get("k").is_none());
    }

    #[test]
    fn test_remove_does_not_touch_ancestors() {
        let parent = root();
        let ns = Namespace::single("remove");
        parent.store(&ns).put("k", StoredValue::new("v"));
        let child = parent.child("[engine:e]/[class:C]", "C", "C").unwrap();

        assert_eq!(text(child.store(&ns).get("k")), Some("v".to_string()));
        assert!(child.store(&ns).remove("k").is_none());
        assert_eq!(text(child.store(&ns).get("k")), Some("v".to_string()));
    }

    #[test]
    fn test_remove_of_shadowing_entry_reveals_ancestor() {
        let parent = root();
        let ns = Namespace::single("shadow");
        parent.store(&ns).put("k", StoredValue::new("parent"));
        let child = parent.child("[engine:e]/[class:C]", "C", "C").unwrap();

        child.store(&ns).put("k", StoredValue::new("child"));
        assert_eq!(text(child.store(&ns).get("k")), Some("child".to_string()));

        let removed = child.store(&ns).remove("k");
        assert_eq!(text(removed), Some("child".to_string()));
        assert_eq!(text(child.store(&ns).get("k")), Some("parent".to_string()));
        assert_eq!(text(parent.store(&ns).get("k")), Some("parent".to_string()));
    }

    #[test]
    fn test_namespace_collaboration() {
        let ctx = root();

        // Two independent extensions agreeing on a namespace type.
        ctx.store(&Namespace::of_type::<SharedKey>())
            .put("connection", StoredValue::new("db"));
        let seen_by_other = ctx.store(&Namespace::of_type::<SharedKey>()).get("connection");
        let seen_by_stranger = ctx.store(&Namespace::of_type::<DifferentKey>()).get("connection");

        assert_eq!(text(seen_by_other), Some("db".to_string()));
        assert!(seen_by_stranger.is_none());
        assert!(ctx.default_store().get("connection").is_none());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let r = root();
        let a = r.child("[engine:e]/[class:A]", "A", "A").unwrap();
        let b = r.child("[engine:e]/[class:B]", "B", "B").unwrap();
        let c = a.child("[engine:e]/[class:A]/[method:c]", "c", "c()").unwrap();

        r.default_store().put("x", StoredValue::new("1"));
        assert_eq!(text(a.default_store().get("x")), Some("1".to_string()));
        assert_eq!(text(b.default_store().get("x")), Some("1".to_string()));
        assert_eq!(text(c.default_store().get("x")), Some("1".to_string()));

        a.default_store().put("x", StoredValue::new("2"));
        assert_eq!(text(c.default_store().get("x")), Some("2".to_string()));
        assert_eq!(text(b.default_store().get("x")), Some("1".to_string()));
        assert_eq!(text(r.default_store().get("x")), Some("1".to_string()));
    }

    #[test]
    fn test_compute_once_under_contention() {
        let ctx = root();
        let store = ctx.default_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store
                        .get_or_compute_if_absent::<_, ()>("expensive", |_| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(25));
                            Ok(StoredValue::new(vec![1_u8, 2, 3]))
                        })
                        .unwrap()
                })
            })
            .collect();

        let values: Vec<StoredValue> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| v.ptr_eq(&values[0])));
    }

    #[test]
    fn test_compute_once_across_store_handles() {
        // Separate `store()` calls on the same node must still share one slot.
        let ctx = root();
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = ctx.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ctx.store(&Namespace::of_type::<SharedKey>())
                        .get_or_compute_as("resource", |_| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(10));
                            Ok::<_, anyhow::Error>(String::from("opened"))
                        })
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let values: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }

    #[test]
    fn test_sibling_subtrees_share_ancestor_concurrently() {
        let r = root();
        r.default_store().put("config", StoredValue::new("shared"));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let r = r.clone();
                thread::spawn(move || {
                    let class = r.child(format!("[engine:e]/[class:C{i}]"), "C", "C").unwrap();
                    for m in 0..50 {
                        let method = class
                            .child(format!("[engine:e]/[class:C{i}]/[method:m{m}]"), "m", "m")
                            .unwrap();
                        method.default_store().put("local", StoredValue::new(m));
                        assert_eq!(
                            method.default_store().get("config").and_then(|v| v.downcast_ref::<&str>().copied()),
                            Some("shared")
                        );
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(r.default_store().get("local").is_none());
        assert_eq!(r.default_store().local_len(), 1);
    }

    #[test]
    fn test_finished_child_releases_its_store() {
        let r = root();
        let child = r.child("[engine:e]/[class:C]", "C", "C").unwrap();
        let payload = Arc::new(String::from("big"));
        child.default_store().put("payload", StoredValue::from_arc(payload.clone()));
        assert_eq!(Arc::strong_count(&payload), 2);

        drop(child);

        assert_eq!(Arc::strong_count(&payload), 1);
        assert!(r.default_store().get("payload").is_none());
    }
}
