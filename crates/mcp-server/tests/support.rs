//! Shared mock Slack port for tool tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;

use slack_client::{ChannelPageRequest, RawUser, SlackPort};
use slack_mcp::tools::SlackService;
use slack_protocol::{Message, SearchMatch, SlackError};

/// Recorded port traffic, for asserting what the tools actually sent.
#[derive(Debug, Default)]
pub struct Calls {
    pub channel_pages: Vec<ChannelPageRequest>,
    pub searches: Vec<(String, u32, String)>,
    pub thread_fetches: Vec<(String, String)>,
    pub user_lookups: Vec<String>,
}

/// Programmable in-memory [`SlackPort`].
///
/// Responses default to not-found / empty; tests install what they need.
/// `identify_self` fails unless `self_id` is set, so envelopes stay free of
/// `current_user` by default.
#[derive(Default)]
pub struct MockPort {
    pub messages: HashMap<(String, String), Message>,
    pub message_error: Option<SlackError>,
    pub threads: HashMap<(String, String), Vec<Message>>,
    pub thread_error: Option<SlackError>,
    pub channel_page: Option<(Vec<Message>, bool)>,
    pub channel_error: Option<SlackError>,
    pub search_page: Option<(Vec<SearchMatch>, u64)>,
    pub search_error: Option<SlackError>,
    pub users: HashMap<String, RawUser>,
    pub self_id: Option<String>,
    pub calls: Mutex<Calls>,
}

#[async_trait]
impl SlackPort for MockPort {
    async fn fetch_message(
        &self,
        channel_id: &str,
        timestamp: &str,
    ) -> Result<Message, SlackError> {
        if let Some(err) = &self.message_error {
            return Err(err.clone());
        }
        self.messages
            .get(&(channel_id.to_string(), timestamp.to_string()))
            .cloned()
            .ok_or(SlackError::MessageNotFound)
    }

    async fn fetch_thread(
        &self,
        channel_id: &str,
        anchor_ts: &str,
    ) -> Result<Vec<Message>, SlackError> {
        self.calls
            .lock()
            .unwrap()
            .thread_fetches
            .push((channel_id.to_string(), anchor_ts.to_string()));
        if let Some(err) = &self.thread_error {
            return Err(err.clone());
        }
        self.threads
            .get(&(channel_id.to_string(), anchor_ts.to_string()))
            .cloned()
            .ok_or(SlackError::MessageNotFound)
    }

    async fn fetch_channel_page(
        &self,
        request: &ChannelPageRequest,
    ) -> Result<(Vec<Message>, bool), SlackError> {
        self.calls.lock().unwrap().channel_pages.push(request.clone());
        if let Some(err) = &self.channel_error {
            return Err(err.clone());
        }
        Ok(self.channel_page.clone().unwrap_or_default())
    }

    async fn fetch_search_page(
        &self,
        query: &str,
        count: u32,
        sort: &str,
    ) -> Result<(Vec<SearchMatch>, u64), SlackError> {
        self.calls
            .lock()
            .unwrap()
            .searches
            .push((query.to_string(), count, sort.to_string()));
        if let Some(err) = &self.search_error {
            return Err(err.clone());
        }
        Ok(self.search_page.clone().unwrap_or_default())
    }

    async fn resolve_user(&self, user_id: &str) -> Result<Option<RawUser>, SlackError> {
        self.calls.lock().unwrap().user_lookups.push(user_id.to_string());
        Ok(self.users.get(user_id).cloned())
    }

    async fn identify_self(&self) -> Result<String, SlackError> {
        self.self_id
            .clone()
            .ok_or_else(|| SlackError::Unclassified("auth.test not stubbed".to_string()))
    }
}

pub fn service(port: MockPort) -> (SlackService, Arc<MockPort>) {
    let port = Arc::new(port);
    (SlackService::new(port.clone()), port)
}

pub fn message(user: &str, text: &str, timestamp: &str, reply_count: u32) -> Message {
    Message {
        user: user.to_string(),
        text: text.to_string(),
        timestamp: timestamp.to_string(),
        reply_count,
        ..Default::default()
    }
}

pub fn raw_user(id: &str, name: &str, display_name: &str, real_name: &str) -> RawUser {
    RawUser {
        id: id.to_string(),
        name: name.to_string(),
        display_name: display_name.to_string(),
        real_name: real_name.to_string(),
        is_bot: false,
        deleted: false,
    }
}

/// Text content of a tool result, asserting it succeeded.
pub fn success_text(result: &CallToolResult) -> String {
    assert_ne!(result.is_error, Some(true), "tool returned error: {result:?}");
    text_of(result)
}

/// Text content of a tool result, asserting it failed.
pub fn error_text(result: &CallToolResult) -> String {
    assert_eq!(result.is_error, Some(true), "tool unexpectedly succeeded");
    text_of(result)
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.clone())
        .expect("tool did not return text content")
}

/// Parses a successful tool result as a JSON envelope.
pub fn success_json(result: &CallToolResult) -> serde_json::Value {
    serde_json::from_str(&success_text(result)).expect("tool returned invalid JSON")
}

/// Convenience wrapper so tests read as tool calls.
pub fn params<T>(request: T) -> Parameters<T> {
    Parameters(request)
}
