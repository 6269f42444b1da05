//! Middleware chain wrapping a node's message handler.
//!
//! Mods compose like layers of an onion: for a chain `[m1, m2, m3]`, a
//! message passes `m1 -> m2 -> m3 -> handler -> m3 -> m2 -> m1`. Each
//! mod receives the [`Next`] continuation and decides whether to invoke
//! the rest of the chain, rewrite the message before or after doing so,
//! or short-circuit by returning a reply of its own.
//!
//! Mods and handlers are synchronous. All parties share one mutable
//! [`Context`] for the duration of the execution.
//!
//! # Examples
//!
//! ```
//! use fedlink::chain::{Chain, Next};
//! use fedlink::context::Context;
//! use fedlink::error::Result;
//! use fedlink::types::{CallType, Message, Metadata};
//!
//! let chain = Chain::new(vec![Chain::boxed(
//!     |message: Message, cx: &mut Context, next: Next<'_>| {
//!         // Pre-processing would happen here.
//!         next.run(message, cx)
//!     },
//! )]);
//!
//! let metadata = Metadata::new(1, "task-1", CallType::Fit);
//! let message = Message::new(metadata, Default::default());
//! let mut cx = Context::new(5, 1);
//! let reply = chain
//!     .execute(message, &mut cx, &|message: Message, _: &mut Context| {
//!         Ok(Message::from_reply(&message, Default::default()))
//!     })
//!     .unwrap();
//! assert_eq!(reply.metadata.task_type, CallType::Fit);
//! ```

use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::types::Message;

/// Terminal message handler sitting at the center of the chain.
pub trait NodeHandler: Send + Sync {
    /// Consumes an inbound message and produces the reply.
    fn handle(&self, message: Message, context: &mut Context) -> Result<Message>;
}

impl<F> NodeHandler for F
where
    F: Fn(Message, &mut Context) -> Result<Message> + Send + Sync,
{
    fn handle(&self, message: Message, context: &mut Context) -> Result<Message> {
        self(message, context)
    }
}

/// A single middleware layer.
pub trait Mod: Send + Sync {
    /// Processes `message`, optionally delegating to `next`.
    ///
    /// Not calling [`Next::run`] short-circuits the chain: inner mods
    /// and the handler never execute, and the returned message flows
    /// back out through the outer mods only.
    fn call(&self, message: Message, context: &mut Context, next: Next<'_>) -> Result<Message>;
}

impl<F> Mod for F
where
    F: for<'a> Fn(Message, &mut Context, Next<'a>) -> Result<Message> + Send + Sync,
{
    fn call(&self, message: Message, context: &mut Context, next: Next<'_>) -> Result<Message> {
        self(message, context, next)
    }
}

/// Continuation over the remaining mods and the terminal handler.
///
/// Consumed by [`Next::run`], so a mod can invoke the rest of the chain
/// at most once.
pub struct Next<'a> {
    mods: &'a [Arc<dyn Mod>],
    handler: &'a dyn NodeHandler,
}

impl Next<'_> {
    /// Runs the rest of the chain and returns its reply.
    pub fn run(self, message: Message, context: &mut Context) -> Result<Message> {
        match self.mods.split_first() {
            Some((head, rest)) => head.call(
                message,
                context,
                Next {
                    mods: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.handle(message, context),
        }
    }
}

/// Ordered stack of mods applied around every handler invocation.
#[derive(Clone, Default)]
pub struct Chain {
    mods: Vec<Arc<dyn Mod>>,
}

impl Chain {
    /// Creates a chain that applies `mods` in the given order, outermost
    /// first.
    pub fn new(mods: Vec<Arc<dyn Mod>>) -> Self {
        Self { mods }
    }

    /// Wraps a mod for inclusion in a chain.
    pub fn boxed<M: Mod + 'static>(m: M) -> Arc<dyn Mod> {
        Arc::new(m)
    }

    /// Number of mods in the chain.
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Returns `true` for a chain with no mods.
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Sends `message` through every mod and into `handler`, returning
    /// the reply that surfaces back out of the outermost mod.
    pub fn execute(
        &self,
        message: Message,
        context: &mut Context,
        handler: &dyn NodeHandler,
    ) -> Result<Message> {
        Next {
            mods: &self.mods,
            handler,
        }
        .run(message, context)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("mods", &self.mods.len()).finish()
    }
}
