//! The unit of work flowing through the pipeline and across the RPC boundary.

use serde::{Deserialize, Serialize};

use crate::types::records::Content;
use crate::types::task::CallType;

/// Immutable identifiers attached to one unit of work.
///
/// Created when a call is issued and never mutated afterwards. A response
/// message may carry a new task id but always references the request's
/// run and group identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// The run this unit of work belongs to.
    pub run_id: u64,
    /// Queue-assigned task identifier; empty until the task is pushed.
    pub task_id: String,
    /// Group identifier, empty unless the issuing proxy is configured
    /// otherwise.
    pub group_id: String,
    /// Time-to-live in milliseconds, `None` for no expiry.
    pub ttl: Option<u64>,
    /// Which remote call this unit of work represents.
    pub task_type: CallType,
}

impl Metadata {
    /// Creates metadata for a freshly issued call.
    pub fn new(run_id: u64, task_id: impl Into<String>, task_type: CallType) -> Self {
        Self {
            run_id,
            task_id: task_id.into(),
            group_id: String::new(),
            ttl: None,
            task_type,
        }
    }

    /// Sets the group identifier.
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Sets the time-to-live in milliseconds.
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }
}

/// One unit of work: metadata plus content.
///
/// Each pipeline stage that transforms a message produces a fresh one; the
/// convention is to carry the metadata over and replace or mutate the
/// content. The relationship between a stage's inbound and outbound
/// message is never enforced as identity.
///
/// # Examples
///
/// ```
/// use fedlink::{CallType, Content, Message, Metadata};
///
/// let inbound = Message::new(Metadata::new(7, "", CallType::Fit), Content::new());
/// let outbound = Message::from_reply(&inbound, Content::new());
/// assert_eq!(outbound.metadata, inbound.metadata);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Immutable identifiers for this unit of work.
    pub metadata: Metadata,
    /// The payload records.
    pub content: Content,
}

impl Message {
    /// Creates a message from metadata and content.
    pub fn new(metadata: Metadata, content: Content) -> Self {
        Self { metadata, content }
    }

    /// Creates an outbound message answering `request`: same metadata,
    /// fresh content.
    pub fn from_reply(request: &Message, content: Content) -> Self {
        Self {
            metadata: request.metadata.clone(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_builder_defaults() {
        let meta = Metadata::new(3, "t-9", CallType::Evaluate);
        assert_eq!(meta.run_id, 3);
        assert_eq!(meta.task_id, "t-9");
        assert_eq!(meta.group_id, "");
        assert_eq!(meta.ttl, None);

        let meta = meta.with_group_id("round-2").with_ttl(30_000);
        assert_eq!(meta.group_id, "round-2");
        assert_eq!(meta.ttl, Some(30_000));
    }

    #[test]
    fn reply_carries_request_metadata() {
        let request = Message::new(
            Metadata::new(1, "abc", CallType::GetParameters).with_group_id("g"),
            Content::new(),
        );
        let reply = Message::from_reply(&request, Content::new());
        assert_eq!(reply.metadata.run_id, 1);
        assert_eq!(reply.metadata.group_id, "g");
        assert_eq!(reply.metadata.task_type, CallType::GetParameters);
    }
}
