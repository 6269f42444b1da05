//! Per-node execution context and its run-scoped store.
//!
//! A [`Context`] travels alongside every message a node handles. Its
//! `state` is a plain [`Content`] that mods and handlers mutate freely;
//! the [`ContextStore`] persists it between task executions of the same
//! run, so state written while handling one task is visible to the next.

use std::sync::Arc;

use dashmap::DashMap;

use crate::types::Content;

/// Mutable state handed to the handler chain for a single execution.
///
/// Identity fields are fixed for the lifetime of the context; only
/// `state` is meant to change.
///
/// # Examples
///
/// ```
/// use fedlink::context::Context;
/// use fedlink::types::MetricsRecord;
///
/// let mut cx = Context::new(7, 42);
/// let mut counter = MetricsRecord::new();
/// counter.set("rounds", 1i64);
/// cx.state.set_metrics("progress", counter);
/// assert_eq!(cx.node_id, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Identifier of the node executing the task.
    pub node_id: u64,
    /// Run this execution belongs to.
    pub run_id: u64,
    /// Arbitrary state shared across mods, the handler, and executions.
    pub state: Content,
}

impl Context {
    /// Creates a context with empty state.
    pub fn new(node_id: u64, run_id: u64) -> Self {
        Self {
            node_id,
            run_id,
            state: Content::new(),
        }
    }
}

/// Keeps one [`Context`] per run for a single node.
///
/// `retrieve` hands out a clone; callers mutate it during execution and
/// `store` it back, making the loop explicit rather than hiding a lock
/// across user code.
#[derive(Debug, Clone)]
pub struct ContextStore {
    node_id: u64,
    contexts: Arc<DashMap<u64, Context>>,
}

impl ContextStore {
    /// Creates an empty store for the given node.
    pub fn new(node_id: u64) -> Self {
        Self {
            node_id,
            contexts: Arc::new(DashMap::new()),
        }
    }

    /// Returns the context for `run_id`, creating a fresh one on first use.
    pub fn retrieve(&self, run_id: u64) -> Context {
        self.contexts
            .entry(run_id)
            .or_insert_with(|| Context::new(self.node_id, run_id))
            .clone()
    }

    /// Persists `context` under its run id, replacing any previous state.
    pub fn store(&self, context: Context) {
        self.contexts.insert(context.run_id, context);
    }

    /// Number of runs with persisted state.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns `true` if no run has persisted state yet.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricsRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn retrieve_creates_fresh_context_per_run() {
        let store = ContextStore::new(11);
        let cx = store.retrieve(1);
        assert_eq!(cx.node_id, 11);
        assert_eq!(cx.run_id, 1);
        assert!(cx.state.is_empty());
    }

    #[test]
    fn stored_state_survives_across_retrievals() {
        let store = ContextStore::new(11);

        let mut cx = store.retrieve(1);
        let mut record = MetricsRecord::new();
        record.set("counter", 3i64);
        cx.state.set_metrics("progress", record);
        store.store(cx.clone());

        assert_eq!(store.retrieve(1), cx);
    }

    #[test]
    fn runs_are_isolated() {
        let store = ContextStore::new(11);

        let mut cx = store.retrieve(1);
        cx.state.set_metrics("progress", MetricsRecord::new());
        store.store(cx);

        assert!(store.retrieve(2).state.is_empty());
        assert_eq!(store.len(), 2);
    }
}
