//! Tests for the execution context.

#[cfg(test)]
mod tests {
    use crate::context::{Deadline, ExecutionContext, MetadataKey, StartTime};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[test]
    fn test_empty_context_has_nothing() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.request_id(), None);
        assert_eq!(ctx.pipeline_name(), None);
        assert_eq!(ctx.stage_index(), None);
        assert_eq!(ctx.depth(), 0);
        assert!(!ctx.contains(&MetadataKey::RequestId));
    }

    #[test]
    fn test_with_value_does_not_touch_original() {
        let base = ExecutionContext::new().with_request_id("req-1");
        let extended = base.with_metadata("user_type", "premium");

        assert_eq!(base.metadata("user_type"), None);
        assert_eq!(extended.metadata_str("user_type"), Some("premium"));
        assert_eq!(extended.request_id(), Some("req-1"));
        assert_eq!(base.depth(), 1);
        assert_eq!(extended.depth(), 2);
    }

    #[test]
    fn test_nearest_binding_wins() {
        let first = ExecutionContext::new().with_request_id("req-1");
        let second = first.with_request_id("req-2");

        assert_eq!(first.request_id(), Some("req-1"));
        assert_eq!(second.request_id(), Some("req-2"));
    }

    #[test]
    fn test_wrong_type_reports_not_found() {
        let ctx = ExecutionContext::new().with_value(MetadataKey::RequestId, 42_u64);

        assert!(ctx.contains(&MetadataKey::RequestId));
        assert_eq!(ctx.request_id(), None);
        assert_eq!(ctx.get::<u64>(&MetadataKey::RequestId), Some(&42));
    }

    #[test]
    fn test_metadata_typed_accessors() {
        let ctx = ExecutionContext::new()
            .with_metadata("validated", true)
            .with_metadata("remaining", 4)
            .with_metadata("user_id", "12345");

        assert_eq!(ctx.metadata_bool("validated"), Some(true));
        assert_eq!(ctx.metadata_i64("remaining"), Some(4));
        assert_eq!(ctx.metadata_str("user_id"), Some("12345"));
        assert_eq!(ctx.metadata_bool("user_id"), None);
        assert_eq!(ctx.metadata("missing"), None);
    }

    #[test]
    fn test_metadata_key_does_not_collide_with_well_known_key() {
        let ctx = ExecutionContext::new().with_metadata("request_id", "from-bag");
        assert_eq!(ctx.request_id(), None);
        assert_eq!(ctx.metadata_str("request_id"), Some("from-bag"));
    }

    #[test]
    fn test_metadata_snapshot_nearest_wins() {
        let ctx = ExecutionContext::new()
            .with_metadata("a", 1)
            .with_request_id("req")
            .with_metadata("b", "x")
            .with_metadata("a", 2);

        let expected: BTreeMap<String, serde_json::Value> = [
            ("a".to_string(), json!(2)),
            ("b".to_string(), json!("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(ctx.metadata_snapshot(), expected);
    }

    #[test]
    fn test_user_and_session_ids() {
        let ctx = ExecutionContext::new()
            .with_user_id("user123")
            .with_session_id("sess-9");
        assert_eq!(ctx.user_id(), Some("user123"));
        assert_eq!(ctx.session_id(), Some("sess-9"));
    }

    #[test]
    fn test_stage_index_reflects_latest() {
        let ctx = ExecutionContext::new()
            .with_stage_index(0)
            .with_stage_index(3);
        assert_eq!(ctx.stage_index(), Some(3));
    }

    #[test]
    fn test_start_time_roundtrip() {
        let start = StartTime::now();
        let ctx = ExecutionContext::new().with_start_time(start);
        let stored = ctx.start_time().unwrap();
        assert_eq!(stored.at, start.at);
    }

    #[test]
    fn test_check_deadline() {
        let ctx = ExecutionContext::new();
        assert!(ctx.check_deadline().is_ok());

        let expired = ctx.with_deadline(Deadline::after(Duration::ZERO));
        assert!(expired.check_deadline().unwrap_err().is_deadline());

        let live = ctx.with_deadline(Deadline::after(Duration::from_secs(60)));
        assert!(live.check_deadline().is_ok());
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExecutionContext>();
    }

    #[test]
    fn test_sibling_contexts_are_isolated() {
        let root = ExecutionContext::new().with_request_id("root");

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let ctx = root.clone();
                std::thread::spawn(move || {
                    let ctx = ctx.with_metadata("worker", i);
                    ctx.metadata_i64("worker")
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(i as i64));
        }
        assert_eq!(root.metadata("worker"), None);
    }
}
