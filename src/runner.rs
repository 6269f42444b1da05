//! Node-side execution loop: pull, run the chain, push the result.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::chain::{Chain, NodeHandler};
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::context::ContextStore;
use crate::error::Result;
use crate::queue::NodeQueue;
use crate::types::TaskRes;

/// Drives one node against a [`NodeQueue`].
///
/// Each pulled instruction becomes a message, passes through the mod
/// chain into the handler, and the outbound message is pushed back as
/// a result answering the instruction. The run's [`Context`] is
/// retrieved before the chain runs and persisted afterwards, so state
/// written by mods or the handler carries over to later instructions of
/// the same run.
///
/// A chain or handler failure never takes down the instructions pulled
/// alongside it: the rest of the batch still executes and pushes
/// results, then [`poll_once`] reports the first failure. The failed
/// instruction produces no result. Queue errors abort immediately.
///
/// [`Context`]: crate::context::Context
/// [`poll_once`]: NodeRunner::poll_once
pub struct NodeRunner<Q, H> {
    node_id: u64,
    queue: Arc<Q>,
    chain: Chain,
    handler: H,
    contexts: ContextStore,
    poll_interval: Duration,
}

impl<Q, H> NodeRunner<Q, H>
where
    Q: NodeQueue,
    H: NodeHandler,
{
    /// Creates a runner for `node_id` with the default poll interval.
    pub fn new(queue: Arc<Q>, node_id: u64, chain: Chain, handler: H) -> Self {
        Self {
            node_id,
            queue,
            chain,
            handler,
            contexts: ContextStore::new(node_id),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Overrides the pause between queue polls in [`run`].
    ///
    /// [`run`]: NodeRunner::run
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Read access to the per-run context store.
    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Pulls pending instructions and executes each through the chain,
    /// returning how many produced a result.
    ///
    /// When an instruction fails in the chain or handler, the remaining
    /// instructions of the batch still run; the first failure is
    /// returned once the batch is done.
    pub async fn poll_once(&self) -> Result<usize> {
        let instructions = self.queue.pull_task_ins(self.node_id).await?;
        let mut processed = 0;
        let mut first_error = None;

        for task_ins in instructions {
            let task_id = task_ins.task_id.clone();
            let run_id = task_ins.run_id;
            debug!(
                node_id = self.node_id,
                run_id,
                task_id = %task_id,
                task_type = %task_ins.task_type,
                "executing instruction"
            );

            let mut context = self.contexts.retrieve(run_id);
            let reply = match self
                .chain
                .execute(task_ins.into_message(), &mut context, &self.handler)
            {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(
                        node_id = self.node_id,
                        task_id = %task_id,
                        error = %err,
                        "instruction failed, no result produced"
                    );
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            self.contexts.store(context);

            let task_res = TaskRes::from_message(reply, &task_id);
            self.queue.push_task_res(task_res).await?;
            processed += 1;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(processed),
        }
    }

    /// Polls the queue forever, pausing between empty polls.
    pub async fn run(&self) -> Result<()> {
        loop {
            if self.poll_once().await? == 0 {
                sleep(self.poll_interval).await;
            }
        }
    }
}
