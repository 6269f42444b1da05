//! Queue-transport envelopes: instructions flowing orchestrator→node and
//! results flowing node→orchestrator.
//!
//! A [`TaskIns`] is created by the codec at encode time and pushed through
//! the queue collaborator, which assigns its `task_id`. A [`TaskRes`]
//! carries its own task id plus a `reply_to` reference naming the
//! instruction it answers; a proxy only consumes results whose `reply_to`
//! and `run_id` match the instruction it pushed. Both envelopes are
//! immutable once pushed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    TASK_TYPE_EVALUATE, TASK_TYPE_FIT, TASK_TYPE_GET_PARAMETERS, TASK_TYPE_GET_PROPERTIES,
};
use crate::types::message::{Message, Metadata};
use crate::types::records::Content;

/// The closed set of remote calls a task can represent.
///
/// Adding a remote call means adding a variant here plus exactly one
/// encode/decode pair in the codec.
///
/// # Examples
///
/// ```
/// use fedlink::CallType;
///
/// assert_eq!(CallType::GetProperties.as_str(), "get-properties");
/// assert_eq!("fit".parse::<CallType>().unwrap(), CallType::Fit);
/// assert!("train".parse::<CallType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallType {
    /// Query node properties.
    GetProperties,
    /// Fetch the node's current model parameters.
    GetParameters,
    /// Run one training round on the node.
    Fit,
    /// Evaluate the given parameters on the node's data.
    Evaluate,
}

impl CallType {
    /// The wire tag for this call type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetProperties => TASK_TYPE_GET_PROPERTIES,
            Self::GetParameters => TASK_TYPE_GET_PARAMETERS,
            Self::Fit => TASK_TYPE_FIT,
            Self::Evaluate => TASK_TYPE_EVALUATE,
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallType {
    type Err = UnknownCallType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TASK_TYPE_GET_PROPERTIES => Ok(Self::GetProperties),
            TASK_TYPE_GET_PARAMETERS => Ok(Self::GetParameters),
            TASK_TYPE_FIT => Ok(Self::Fit),
            TASK_TYPE_EVALUATE => Ok(Self::Evaluate),
            other => Err(UnknownCallType(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized call-type tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown call type: {0}")]
pub struct UnknownCallType(pub String);

/// An instruction envelope, orchestrator→node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIns {
    /// Queue-assigned identifier; empty until pushed.
    pub task_id: String,
    /// Group identifier carried from the issuing proxy.
    pub group_id: String,
    /// The run this instruction belongs to.
    pub run_id: u64,
    /// Which remote call this instruction represents.
    pub task_type: CallType,
    /// Unaddressed instruction from a proxy bound to an ephemeral node:
    /// served by whichever node pulls it first rather than a specific
    /// registered node id.
    #[serde(default)]
    pub anonymous: bool,
    /// Time-to-live in milliseconds, `None` for no expiry.
    pub ttl: Option<u64>,
    /// When the instruction was created.
    pub created_at: DateTime<Utc>,
    /// The encoded call payload.
    pub content: Content,
}

impl TaskIns {
    /// Creates an unpushed instruction (empty `task_id`, stamped now).
    pub fn new(run_id: u64, group_id: impl Into<String>, task_type: CallType, content: Content) -> Self {
        Self {
            task_id: String::new(),
            group_id: group_id.into(),
            run_id,
            task_type,
            anonymous: false,
            ttl: None,
            created_at: Utc::now(),
            content,
        }
    }

    /// Converts this instruction into the message handed to the node's
    /// mod chain.
    pub fn into_message(self) -> Message {
        let metadata = Metadata {
            run_id: self.run_id,
            task_id: self.task_id,
            group_id: self.group_id,
            ttl: self.ttl,
            task_type: self.task_type,
        };
        Message::new(metadata, self.content)
    }
}

/// A result envelope, node→orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRes {
    /// This result's own identifier.
    pub task_id: String,
    /// The instruction task id this result answers.
    pub reply_to: String,
    /// Group identifier carried from the instruction.
    pub group_id: String,
    /// The run the answered instruction belongs to.
    pub run_id: u64,
    /// Which remote call this result answers.
    pub task_type: CallType,
    /// When the result was created.
    pub created_at: DateTime<Utc>,
    /// The encoded response payload.
    pub content: Content,
}

impl TaskRes {
    /// Builds a result from the outbound message the mod chain produced,
    /// answering the instruction identified by `reply_to`.
    ///
    /// The result gets a fresh task id of its own; run and group
    /// identifiers come from the message's metadata, which the chain
    /// carried over from the instruction.
    pub fn from_message(message: Message, reply_to: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            reply_to: reply_to.into(),
            group_id: message.metadata.group_id,
            run_id: message.metadata.run_id,
            task_type: message.metadata.task_type,
            created_at: Utc::now(),
            content: message.content,
        }
    }

    /// Returns `true` if this result answers the given instruction id in
    /// the given run.
    pub fn answers(&self, task_id: &str, run_id: u64) -> bool {
        self.reply_to == task_id && self.run_id == run_id
    }
}
