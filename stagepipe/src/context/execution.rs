//! The immutable, chain-extended execution context.

use super::keys::{MetadataKey, StartTime};
use super::Deadline;
use crate::errors::PipelineResult;
use crate::observability::Span;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

struct Node {
    key: MetadataKey,
    value: Value,
    parent: Option<Arc<Node>>,
}

/// Request-scoped metadata carried alongside the payload of a pipeline run.
///
/// A context is a persistent association list: every `with_*` call returns a
/// new context whose head binds one key and whose tail is the original. The
/// original is never touched, so a snapshot held by an earlier stage or by
/// the caller keeps resolving exactly as before. Cloning is a reference-count
/// bump.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    head: Option<Arc<Node>>,
}

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context that resolves `key` to `value` and defers to `self`
    /// for every other key.
    #[must_use]
    pub fn with_value<V>(&self, key: MetadataKey, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Node {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the nearest binding of `key` as a `V`.
    ///
    /// A binding of a different type reports `None`.
    #[must_use]
    pub fn get<V: Any>(&self, key: &MetadataKey) -> Option<&V> {
        self.find(|k| k == key)
            .and_then(|value| value.downcast_ref::<V>())
    }

    /// Looks up the nearest binding of `key` without a type check.
    #[must_use]
    pub fn get_any(&self, key: &MetadataKey) -> Option<&(dyn Any + Send + Sync)> {
        self.find(|k| k == key)
    }

    /// Returns true if `key` is bound anywhere in the chain.
    #[must_use]
    pub fn contains(&self, key: &MetadataKey) -> bool {
        self.get_any(key).is_some()
    }

    /// Number of bindings in the chain, shadowed ones included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes().count()
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
    }

    fn find(&self, matches: impl Fn(&MetadataKey) -> bool) -> Option<&(dyn Any + Send + Sync)> {
        self.nodes()
            .find(|node| matches(&node.key))
            .map(|node| node.value.as_ref())
    }

    fn get_string(&self, key: &MetadataKey) -> Option<&str> {
        self.get::<String>(key).map(String::as_str)
    }

    // Open-ended metadata.

    /// Adds an open-bag metadata entry.
    #[must_use]
    pub fn with_metadata(
        &self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        let value: serde_json::Value = value.into();
        self.with_value(MetadataKey::Metadata(key.into()), value)
    }

    /// Looks up an open-bag metadata entry.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.find(|k| k.is_metadata(key))
            .and_then(|value| value.downcast_ref::<serde_json::Value>())
    }

    /// Looks up an open-bag entry holding a string.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata(key).and_then(serde_json::Value::as_str)
    }

    /// Looks up an open-bag entry holding a boolean.
    #[must_use]
    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata(key).and_then(serde_json::Value::as_bool)
    }

    /// Looks up an open-bag entry holding an integer.
    #[must_use]
    pub fn metadata_i64(&self, key: &str) -> Option<i64> {
        self.metadata(key).and_then(serde_json::Value::as_i64)
    }

    /// Collects the visible open-bag entries; nearer bindings win.
    #[must_use]
    pub fn metadata_snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        let mut snapshot = BTreeMap::new();
        for node in self.nodes() {
            if let MetadataKey::Metadata(key) = &node.key {
                if let Some(value) = node.value.downcast_ref::<serde_json::Value>() {
                    snapshot.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        snapshot
    }

    // Well-known keys.

    /// Sets the request identifier.
    #[must_use]
    pub fn with_request_id(&self, request_id: impl Into<String>) -> Self {
        self.with_value(MetadataKey::RequestId, request_id.into())
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.get_string(&MetadataKey::RequestId)
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_pipeline_name(&self, name: impl Into<String>) -> Self {
        self.with_value(MetadataKey::PipelineName, name.into())
    }

    /// Returns the name of the pipeline currently running.
    #[must_use]
    pub fn pipeline_name(&self) -> Option<&str> {
        self.get_string(&MetadataKey::PipelineName)
    }

    /// Sets the user identifier.
    #[must_use]
    pub fn with_user_id(&self, user_id: impl Into<String>) -> Self {
        self.with_value(MetadataKey::UserId, user_id.into())
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.get_string(&MetadataKey::UserId)
    }

    /// Sets the session identifier.
    #[must_use]
    pub fn with_session_id(&self, session_id: impl Into<String>) -> Self {
        self.with_value(MetadataKey::SessionId, session_id.into())
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.get_string(&MetadataKey::SessionId)
    }

    pub(crate) fn with_stage_index(&self, index: usize) -> Self {
        self.with_value(MetadataKey::StageIndex, index)
    }

    /// Returns the position of the stage currently running.
    #[must_use]
    pub fn stage_index(&self) -> Option<usize> {
        self.get::<usize>(&MetadataKey::StageIndex).copied()
    }

    /// Records the observability start time.
    #[must_use]
    pub fn with_start_time(&self, start: StartTime) -> Self {
        self.with_value(MetadataKey::StartTime, start)
    }

    /// Returns the observability start time.
    #[must_use]
    pub fn start_time(&self) -> Option<&StartTime> {
        self.get::<StartTime>(&MetadataKey::StartTime)
    }

    /// Binds a deadline.
    #[must_use]
    pub fn with_deadline(&self, deadline: Deadline) -> Self {
        self.with_value(MetadataKey::Deadline, deadline)
    }

    /// Returns the nearest deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<&Deadline> {
        self.get::<Deadline>(&MetadataKey::Deadline)
    }

    /// Fails if a deadline is bound and it was cancelled or has expired.
    pub fn check_deadline(&self) -> PipelineResult<()> {
        self.deadline().map_or(Ok(()), Deadline::check)
    }

    /// Binds the active span.
    #[must_use]
    pub fn with_span(&self, span: Arc<dyn Span>) -> Self {
        self.with_value(MetadataKey::Span, span)
    }

    /// Returns the active span.
    #[must_use]
    pub fn span(&self) -> Option<&Arc<dyn Span>> {
        self.get::<Arc<dyn Span>>(&MetadataKey::Span)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("request_id", &self.request_id())
            .field("pipeline_name", &self.pipeline_name())
            .field("stage_index", &self.stage_index())
            .field("metadata", &self.metadata_snapshot())
            .finish()
    }
}
