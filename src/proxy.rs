//! Remote call proxy: typed calls over the push/poll task queue.
//!
//! A [`NodeProxy`] turns each call into an instruction, pushes it to
//! the queue, then polls until the matching result arrives or the
//! caller's timeout expires. Matching is by the queue-assigned task id
//! plus the run id, so stale results from other instructions or runs
//! are never returned. Every call always does at least one poll, even
//! with a zero timeout.

use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::codec;
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::error::{Error, Result};
use crate::queue::TaskQueue;
use crate::types::{
    CallType, Content, EvaluateIns, EvaluateRes, FitIns, FitRes, GetParametersIns,
    GetParametersRes, GetPropertiesIns, GetPropertiesRes, TaskIns,
};

/// Typed facade over a [`TaskQueue`] for one remote node.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use fedlink::proxy::NodeProxy;
/// use fedlink::queue::InMemoryQueue;
/// use fedlink::types::GetPropertiesIns;
///
/// # async fn demo() -> fedlink::error::Result<()> {
/// let queue = Arc::new(InMemoryQueue::new());
/// queue.register_node(5);
///
/// let proxy = NodeProxy::new(queue, 5, 1).with_group_id("round-0");
/// let res = proxy
///     .get_properties(&GetPropertiesIns::default(), Some(Duration::from_secs(3)))
///     .await?;
/// # let _ = res;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NodeProxy<Q> {
    queue: Arc<Q>,
    node_id: u64,
    run_id: u64,
    group_id: String,
    anonymous: bool,
    poll_interval: Duration,
}

impl<Q: TaskQueue> NodeProxy<Q> {
    /// Creates a proxy for `node_id` within `run_id` with the default
    /// poll interval.
    pub fn new(queue: Arc<Q>, node_id: u64, run_id: u64) -> Self {
        Self {
            queue,
            node_id,
            run_id,
            group_id: String::new(),
            anonymous: false,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Sets the group id stamped onto every instruction.
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Marks this proxy as bound to an anonymous (ephemeral) node.
    ///
    /// Instructions from an anonymous proxy are not addressed to a
    /// registered node id; the queue hands them to whichever node pulls
    /// first. Identified proxies, the default, address a durable node id
    /// that must be known to the queue.
    pub fn with_anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Overrides how often pending results are polled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The node this proxy addresses.
    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Asks the node for its properties.
    pub async fn get_properties(
        &self,
        ins: &GetPropertiesIns,
        timeout: Option<Duration>,
    ) -> Result<GetPropertiesRes> {
        let content = codec::get_properties_ins_to_content(ins);
        let reply = self
            .call(CallType::GetProperties, content, timeout)
            .await?;
        codec::content_to_get_properties_res(&reply)
    }

    /// Asks the node for its current model parameters.
    pub async fn get_parameters(
        &self,
        ins: &GetParametersIns,
        timeout: Option<Duration>,
    ) -> Result<GetParametersRes> {
        let content = codec::get_parameters_ins_to_content(ins);
        let reply = self
            .call(CallType::GetParameters, content, timeout)
            .await?;
        codec::content_to_get_parameters_res(&reply)
    }

    /// Instructs the node to train on its local data.
    pub async fn fit(&self, ins: &FitIns, timeout: Option<Duration>) -> Result<FitRes> {
        let content = codec::fit_ins_to_content(ins);
        let reply = self.call(CallType::Fit, content, timeout).await?;
        codec::content_to_fit_res(&reply)
    }

    /// Instructs the node to evaluate the given parameters.
    pub async fn evaluate(
        &self,
        ins: &EvaluateIns,
        timeout: Option<Duration>,
    ) -> Result<EvaluateRes> {
        let content = codec::evaluate_ins_to_content(ins);
        let reply = self.call(CallType::Evaluate, content, timeout).await?;
        codec::content_to_evaluate_res(&reply)
    }

    async fn call(
        &self,
        task_type: CallType,
        content: Content,
        timeout: Option<Duration>,
    ) -> Result<Content> {
        let mut task_ins = TaskIns::new(self.run_id, self.group_id.clone(), task_type, content);
        task_ins.anonymous = self.anonymous;
        task_ins.ttl = timeout.map(|t| t.as_millis() as u64);

        let task_id = self.queue.push_task_ins(self.node_id, task_ins).await?;
        debug!(
            node_id = self.node_id,
            run_id = self.run_id,
            task_id = %task_id,
            task_type = %task_type,
            "instruction pushed"
        );

        self.receive(task_id, timeout).await
    }

    /// Polls the queue until the result answering `task_id` arrives.
    ///
    /// The final poll may land exactly on the deadline, so a result that
    /// becomes ready just in time is still delivered; [`Error::Timeout`]
    /// is returned only once the deadline has passed with no match, and
    /// the queue is not polled again afterwards.
    async fn receive(&self, task_id: String, timeout: Option<Duration>) -> Result<Content> {
        let started = Instant::now();
        let task_ids = [task_id.clone()];

        loop {
            let ready = self.queue.pull_task_res(&task_ids).await?;
            trace!(task_id = %task_id, ready = ready.len(), "polled for results");

            if let Some(res) = ready
                .into_iter()
                .find(|res| res.answers(&task_id, self.run_id))
            {
                debug!(task_id = %task_id, res_id = %res.task_id, "result received");
                return Ok(res.content);
            }

            match timeout {
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        return Err(Error::Timeout { task_id, elapsed });
                    }
                    sleep(cmp::min(self.poll_interval, limit - elapsed)).await;
                }
                None => sleep(self.poll_interval).await,
            }
        }
    }
}
