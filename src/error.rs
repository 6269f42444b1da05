//! Error types for queue-mediated calls and pipeline execution.
//!
//! Provides [`Error`], the crate-wide error enum, and the [`Result`] alias.
//! Transport-level failures (timeouts, schema mismatches, unknown nodes)
//! are errors; an application-level non-`OK` [`Status`](crate::types::Status)
//! is part of the typed response and never raised through this type.

use std::time::Duration;

use crate::types::CallType;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the proxy, codec, chain, and queue collaborators.
///
/// The core never logs and swallows: every variant propagates to the
/// immediate caller. Orchestration code should treat `Timeout`,
/// `SchemaMismatch`, and `UnknownNode` as recoverable per-node failures
/// (typically: drop the node from the current round) rather than aborting
/// a whole run.
///
/// # Examples
///
/// ```
/// use fedlink::{Error, CallType};
///
/// let err = Error::UnknownNode(42);
/// assert_eq!(err.to_string(), "unknown node: 42");
///
/// let err = Error::SchemaMismatch {
///     task_type: CallType::Fit,
///     detail: "missing record: fitres.status".to_string(),
/// };
/// assert!(err.to_string().contains("fitres.status"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No matching result arrived within the caller-specified bound.
    ///
    /// Raised by the remote call proxy only.
    #[error("timed out after {elapsed:?} waiting for result of task {task_id}")]
    Timeout {
        /// The instruction task id that never got a matching result.
        task_id: String,
        /// Time spent polling before giving up.
        elapsed: Duration,
    },

    /// A Content could not be decoded for the expected call type.
    ///
    /// Indicates a protocol or codec mismatch between orchestrator and
    /// node. Raised by the codec, propagated unchanged by the proxy.
    #[error("schema mismatch decoding {task_type} content: {detail}")]
    SchemaMismatch {
        /// The call type the decoder expected.
        task_type: CallType,
        /// Which record was missing or had the wrong kind.
        detail: String,
    },

    /// A push addressed a node id the queue collaborator does not know.
    #[error("unknown node: {0}")]
    UnknownNode(u64),

    /// Any other transport-level failure reported by the queue collaborator.
    #[error("queue error: {0}")]
    Queue(String),

    /// A mod or terminal handler failed.
    ///
    /// The chain executor performs no recovery: the failure propagates
    /// unchanged through every enclosing mod to the chain's caller. A mod
    /// wishing to convert a failure into a normal (possibly
    /// short-circuited) message must catch it itself.
    #[error("handler error: {0}")]
    Handler(String),
}
