//! Federated-learning orchestration core: middleware chains, typed
//! remote calls, and the task queue that connects them.
//!
//! # Overview
//!
//! Two halves cooperate over an asynchronous push/poll task queue. On
//! the orchestrator side, a [`NodeProxy`](proxy::NodeProxy) offers four
//! typed calls (`get_properties`, `get_parameters`, `fit`, `evaluate`):
//! each call is encoded into a content envelope, pushed as an
//! instruction, and the proxy polls until the matching result arrives
//! or the caller's timeout expires. On the node side, a
//! [`NodeRunner`](runner::NodeRunner) pulls instructions and sends each
//! through a [`Chain`](chain::Chain) of mods wrapped around the node's
//! terminal handler, sharing one mutable
//! [`Context`](context::Context) per run across executions.
//!
//! # Module Organization
//!
//! - [`types`] - Records, content envelopes, messages, task wire types,
//!   and the typed call structs
//! - [`codec`] - Encode/decode between typed calls and [`Content`]
//! - [`chain`] - Mod chain executor and handler traits
//! - [`context`] - Per-node, per-run mutable state and its store
//! - [`queue`] - Queue collaborator traits and [`InMemoryQueue`]
//! - [`proxy`] - Synchronous-looking typed calls over the queue
//! - [`runner`] - Node-side pull/execute/push loop
//! - [`error`] - Crate error type and `Result` alias
//! - [`constants`] - Call type tags and timing defaults
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fedlink::chain::Chain;
//! use fedlink::codec;
//! use fedlink::context::Context;
//! use fedlink::proxy::NodeProxy;
//! use fedlink::queue::InMemoryQueue;
//! use fedlink::runner::NodeRunner;
//! use fedlink::types::{GetPropertiesIns, GetPropertiesRes, Message, Status};
//!
//! # async fn demo() -> fedlink::error::Result<()> {
//! let queue = Arc::new(InMemoryQueue::new());
//! queue.register_node(5);
//!
//! // Node side: answer every get_properties call.
//! let handler = |message: Message, _: &mut Context| {
//!     let res = GetPropertiesRes {
//!         status: Status::ok(),
//!         properties: Default::default(),
//!     };
//!     Ok(Message::from_reply(
//!         &message,
//!         codec::get_properties_res_to_content(&res),
//!     ))
//! };
//! let runner = NodeRunner::new(queue.clone(), 5, Chain::default(), handler);
//!
//! // Orchestrator side: issue a typed call with a timeout.
//! let proxy = NodeProxy::new(queue, 5, 1);
//! let ins = GetPropertiesIns::default();
//! let call = proxy.get_properties(&ins, Some(Duration::from_secs(3)));
//!
//! let (res, _) = tokio::join!(call, runner.poll_once());
//! assert!(res?.status.is_ok());
//! # Ok(())
//! # }
//! ```
//!
//! [`Content`]: types::Content
//! [`InMemoryQueue`]: queue::InMemoryQueue

pub mod chain;
pub mod codec;
pub mod constants;
pub mod context;
pub mod error;
pub mod proxy;
pub mod queue;
pub mod runner;
pub mod types;

// Re-exports for ergonomic access
pub use chain::{Chain, Mod, Next, NodeHandler};
pub use context::{Context, ContextStore};
pub use error::{Error, Result};
pub use proxy::NodeProxy;
pub use queue::{InMemoryQueue, NodeQueue, TaskQueue};
pub use runner::NodeRunner;
pub use types::*;
