//! Shared wire types for the Slack MCP server.
//!
//! Everything that crosses a crate boundary lives here: the message and
//! identity model, the coordinate produced by permalink parsing, the
//! response envelopes serialized back to MCP clients, and the closed error
//! taxonomy with its free-text classifier.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod error;

pub use error::{classify, SlackError};

/// A single Slack message.
///
/// `user`, `text`, `timestamp`, `thread_ts`, and `reply_count` are the
/// authoritative copy from the Slack API. The `*_name` fields are derived
/// annotations attached during identity resolution and are never sent back
/// to Slack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    /// Author user id. Empty for system messages.
    #[serde(default)]
    pub user: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Message timestamp in API format, e.g. "1355517523.000008".
    pub timestamp: String,
    /// Parent thread timestamp, present only on thread replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Number of replies. Meaningful only on thread-parent messages.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reply_count: u32,
    /// Author handle, resolved best-effort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Author display name, resolved best-effort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Author real name, resolved best-effort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

fn is_zero(count: &u32) -> bool {
    *count == 0
}

/// Resolved identity for a Slack user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserInfo {
    pub id: String,
    /// Workspace handle (the `name` field of the Slack profile).
    pub name: String,
    /// Display name after the fallback chain: profile display name,
    /// profile real name, then handle.
    pub display_name: String,
    pub real_name: String,
    pub is_bot: bool,
    pub is_deleted: bool,
}

impl UserInfo {
    /// Placeholder identity cached for user ids Slack no longer knows.
    pub fn deleted_placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "deleted_user".to_string(),
            display_name: "Deleted User".to_string(),
            real_name: "Deleted User".to_string(),
            is_bot: false,
            is_deleted: true,
        }
    }
}

/// One full-text search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchMatch {
    pub channel_id: String,
    pub channel_name: String,
    /// Author user id. Empty when the match has no resolvable author.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default)]
    pub text: String,
    pub timestamp: String,
    pub permalink: String,
}

/// Coordinate reconstructed from a Slack message permalink.
///
/// Produced once by the permalink parser and consumed by exactly one
/// `read_message` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCoordinate {
    pub channel_id: String,
    /// Message timestamp in API format.
    pub timestamp: String,
    /// Thread parent timestamp, copied verbatim from the `thread_ts`
    /// query parameter when present.
    pub thread_anchor: Option<String>,
    /// True when the URL explicitly referenced a thread.
    pub is_thread_reference: bool,
}

/// Mapping from mentioned user id to resolved identity. An entry exists
/// only if resolution succeeded; absence is never an error.
pub type UserMapping = HashMap<String, UserInfo>;

/// Envelope for `read_message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadMessageResult {
    pub message: Message,
    /// All messages in the thread, parent included. Absent when the
    /// message is not part of a thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<Message>>,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_mapping: Option<UserMapping>,
}

/// Envelope for `list_channel_messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListChannelMessagesResult {
    pub messages: Vec<Message>,
    pub channel_id: String,
    /// Forwarded verbatim from the Slack API, never recomputed.
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_mapping: Option<UserMapping>,
}

/// Envelope for `search_messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchMessagesResult {
    pub query: String,
    /// Total matches known to Slack; may exceed the returned page.
    pub total: u64,
    pub matches: Vec<SearchMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserInfo>,
}
