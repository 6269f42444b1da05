//! Task queue collaborator contracts and the in-memory implementation.
//!
//! Two views of the same queue exist. [`TaskQueue`] is the caller side
//! used by the proxy: push instructions, poll for results. [`NodeQueue`]
//! is the worker side used by the runner: pull pending instructions,
//! push results back. Both are async so network-backed implementations
//! can slot in without changing callers.

mod memory;

pub use memory::InMemoryQueue;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TaskIns, TaskRes};

/// Caller-side queue operations.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueues an instruction for its target node and returns the
    /// queue-assigned task id.
    async fn push_task_ins(&self, node_id: u64, task_ins: TaskIns) -> Result<String>;

    /// Returns results produced for the given task ids.
    ///
    /// May return an empty list when nothing is ready yet; returned
    /// results are consumed and will not be delivered twice.
    async fn pull_task_res(&self, task_ids: &[String]) -> Result<Vec<TaskRes>>;

    /// Returns the ids of all identified nodes currently known to the
    /// queue, in registration order.
    ///
    /// Orchestration code uses this to discover which nodes it can
    /// build proxies for. Anonymous nodes are never listed.
    async fn list_nodes(&self) -> Result<Vec<u64>>;
}

/// Worker-side queue operations.
#[async_trait]
pub trait NodeQueue: Send + Sync {
    /// Returns instructions pending for `node_id`, consuming them.
    async fn pull_task_ins(&self, node_id: u64) -> Result<Vec<TaskIns>>;

    /// Publishes a result for a previously pulled instruction.
    async fn push_task_res(&self, task_res: TaskRes) -> Result<String>;
}
