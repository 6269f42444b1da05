//! In-memory queue for tests and single-process deployments.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::queue::{NodeQueue, TaskQueue};
use crate::types::{TaskIns, TaskRes};

/// Process-local queue backed by [`DashMap`].
///
/// Records are held as serialized JSON snapshots, so pushing and
/// pulling exercise the same encode path a remote queue would. Nodes
/// must be registered before instructions can be addressed to them;
/// anonymous instructions bypass addressing entirely and go to an
/// unclaimed pool served to whichever node pulls first.
///
/// Cloning is cheap and clones share storage.
///
/// # Examples
///
/// ```no_run
/// use fedlink::queue::{InMemoryQueue, NodeQueue, TaskQueue};
/// use fedlink::types::{CallType, Content, TaskIns};
///
/// # async fn demo() -> fedlink::error::Result<()> {
/// let queue = InMemoryQueue::new();
/// queue.register_node(5);
///
/// let ins = TaskIns::new(1, "", CallType::GetProperties, Content::new());
/// let task_id = queue.push_task_ins(5, ins).await?;
/// let pending = queue.pull_task_ins(5).await?;
/// assert_eq!(pending[0].task_id, task_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueue {
    nodes: Arc<RwLock<Vec<u64>>>,
    pending: Arc<DashMap<u64, Vec<serde_json::Value>>>,
    unclaimed: Arc<RwLock<Vec<serde_json::Value>>>,
    results: Arc<DashMap<String, serde_json::Value>>,
}

impl InMemoryQueue {
    /// Creates an empty queue with no registered nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `node_id` addressable. Registering twice is a no-op.
    pub fn register_node(&self, node_id: u64) {
        let mut nodes = self.nodes.write();
        if !nodes.contains(&node_id) {
            nodes.push(node_id);
            debug!(node_id, "node registered");
        }
    }

    /// Removes `node_id` and drops its pending instructions.
    pub fn unregister_node(&self, node_id: u64) {
        self.nodes.write().retain(|id| *id != node_id);
        self.pending.remove(&node_id);
        debug!(node_id, "node unregistered");
    }

    fn is_registered(&self, node_id: u64) -> bool {
        self.nodes.read().contains(&node_id)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::Queue(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Queue(e.to_string()))
}

#[async_trait]
impl TaskQueue for InMemoryQueue {
    async fn push_task_ins(&self, node_id: u64, mut task_ins: TaskIns) -> Result<String> {
        if !task_ins.anonymous && !self.is_registered(node_id) {
            return Err(Error::UnknownNode(node_id));
        }

        let task_id = Uuid::new_v4().to_string();
        task_ins.task_id = task_id.clone();
        debug!(
            node_id,
            task_id = %task_id,
            task_type = %task_ins.task_type,
            anonymous = task_ins.anonymous,
            "task pushed"
        );

        let snapshot = to_json(&task_ins)?;
        if task_ins.anonymous {
            self.unclaimed.write().push(snapshot);
        } else {
            self.pending.entry(node_id).or_default().push(snapshot);
        }
        Ok(task_id)
    }

    async fn pull_task_res(&self, task_ids: &[String]) -> Result<Vec<TaskRes>> {
        let mut ready = Vec::new();
        for task_id in task_ids {
            if let Some((_, snapshot)) = self.results.remove(task_id) {
                ready.push(from_json(snapshot)?);
            }
        }
        Ok(ready)
    }

    async fn list_nodes(&self) -> Result<Vec<u64>> {
        Ok(self.nodes.read().clone())
    }
}

#[async_trait]
impl NodeQueue for InMemoryQueue {
    async fn pull_task_ins(&self, node_id: u64) -> Result<Vec<TaskIns>> {
        if !self.is_registered(node_id) {
            return Err(Error::UnknownNode(node_id));
        }

        let mut snapshots = self
            .pending
            .remove(&node_id)
            .map(|(_, snapshots)| snapshots)
            .unwrap_or_default();
        snapshots.append(&mut self.unclaimed.write());
        snapshots.into_iter().map(from_json).collect()
    }

    async fn push_task_res(&self, task_res: TaskRes) -> Result<String> {
        let task_id = task_res.task_id.clone();
        debug!(
            task_id = %task_id,
            reply_to = %task_res.reply_to,
            "result pushed"
        );
        let snapshot = to_json(&task_res)?;
        // Results are keyed by the instruction they answer.
        self.results.insert(task_res.reply_to.clone(), snapshot);
        Ok(task_id)
    }
}
