use async_trait::async_trait;

use slack_protocol::{Message, SearchMatch, SlackError};

/// Raw profile data as the directory service reports it, before the
/// display-name fallback chain is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUser {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub real_name: String,
    pub is_bot: bool,
    pub deleted: bool,
}

/// Parameters for one bounded channel-history page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPageRequest {
    pub channel_id: String,
    /// Already clamped by the caller; forwarded as-is.
    pub limit: u32,
    pub oldest: Option<String>,
    pub latest: Option<String>,
}

/// Remote directory/messaging capability consumed by the tool assemblers.
///
/// Every method may fail with a classified [`SlackError`]; no retries
/// happen at this layer. Cancellation propagates by dropping the future.
#[async_trait]
pub trait SlackPort: Send + Sync {
    /// Fetches the single message at (channel, timestamp).
    /// `MessageNotFound` when nothing exists at the coordinate.
    async fn fetch_message(&self, channel_id: &str, timestamp: &str)
        -> Result<Message, SlackError>;

    /// Fetches all messages of a thread in order, parent included.
    /// `MessageNotFound` when the thread is empty.
    async fn fetch_thread(
        &self,
        channel_id: &str,
        anchor_ts: &str,
    ) -> Result<Vec<Message>, SlackError>;

    /// Fetches one reverse-chronological history page. The boolean is the
    /// service's own has-more flag, forwarded verbatim.
    async fn fetch_channel_page(
        &self,
        request: &ChannelPageRequest,
    ) -> Result<(Vec<Message>, bool), SlackError>;

    /// Fetches one page of full-text search results plus the total match
    /// count known to the service (which may exceed the page).
    async fn fetch_search_page(
        &self,
        query: &str,
        count: u32,
        sort: &str,
    ) -> Result<(Vec<SearchMatch>, u64), SlackError>;

    /// Resolves a user id. `Ok(None)` means the directory no longer knows
    /// the id (deleted user); any other failure is a classified error.
    async fn resolve_user(&self, user_id: &str) -> Result<Option<RawUser>, SlackError>;

    /// Identifies the authenticated caller, returning its user id.
    async fn identify_self(&self) -> Result<String, SlackError>;
}
