use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use slack_protocol::{classify, Message, SearchMatch, SlackError};

use crate::port::{ChannelPageRequest, RawUser, SlackPort};

const API_BASE: &str = "https://slack.com/api";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Production [`SlackPort`] adapter over the Slack Web API.
///
/// History, replies, and directory calls use the bot token; search uses the
/// optional user token and reports `UserTokenNotConfigured` without issuing
/// a request when it is absent.
pub struct WebApi {
    http: reqwest::Client,
    bot_token: String,
    user_token: Option<String>,
}

impl WebApi {
    pub fn new(bot_token: String, user_token: Option<String>) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| SlackError::Unclassified(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            bot_token,
            user_token,
        })
    }

    fn api_url(&self, method: &str) -> Result<Url, SlackError> {
        Url::parse(&format!("{API_BASE}/{method}"))
            .map_err(|err| SlackError::Unclassified(format!("invalid API URL: {err}")))
    }

    /// Issues a GET and decodes the standard `ok`/`error` envelope.
    async fn get<T>(&self, method: &str, token: &str, query: &[(&str, &str)]) -> Result<T, SlackError>
    where
        T: ApiEnvelope + for<'de> Deserialize<'de>,
    {
        let url = self.api_url(method)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|err| SlackError::Unclassified(format!("Slack API transport error: {err}")))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(SlackError::RateLimited);
        }

        let body: T = response
            .json()
            .await
            .map_err(|err| SlackError::Unclassified(format!("Slack API decode error: {err}")))?;

        if !body.ok() {
            let raw = body.error().unwrap_or("unknown");
            log::debug!("slack api {method} failed: {raw}");
            return Err(classify(raw));
        }
        Ok(body)
    }
}

#[async_trait]
impl SlackPort for WebApi {
    async fn fetch_message(
        &self,
        channel_id: &str,
        timestamp: &str,
    ) -> Result<Message, SlackError> {
        let body: HistoryResponse = self
            .get(
                "conversations.history",
                &self.bot_token,
                &[
                    ("channel", channel_id),
                    ("oldest", timestamp),
                    ("latest", timestamp),
                    ("inclusive", "true"),
                    ("limit", "1"),
                ],
            )
            .await?;

        body.messages
            .into_iter()
            .next()
            .map(ApiMessage::into_message)
            .ok_or(SlackError::MessageNotFound)
    }

    async fn fetch_thread(
        &self,
        channel_id: &str,
        anchor_ts: &str,
    ) -> Result<Vec<Message>, SlackError> {
        let mut all = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut query = vec![("channel", channel_id), ("ts", anchor_ts)];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }
            let body: HistoryResponse = self
                .get("conversations.replies", &self.bot_token, &query)
                .await?;

            all.extend(body.messages.into_iter().map(ApiMessage::into_message));

            let next = body
                .response_metadata
                .map(|meta| meta.next_cursor)
                .unwrap_or_default();
            if !body.has_more || next.is_empty() {
                break;
            }
            cursor = next;
        }

        if all.is_empty() {
            return Err(SlackError::MessageNotFound);
        }
        Ok(all)
    }

    async fn fetch_channel_page(
        &self,
        request: &ChannelPageRequest,
    ) -> Result<(Vec<Message>, bool), SlackError> {
        let limit = request.limit.to_string();
        let mut query = vec![
            ("channel", request.channel_id.as_str()),
            ("limit", limit.as_str()),
        ];
        if let Some(oldest) = request.oldest.as_deref() {
            query.push(("oldest", oldest));
        }
        if let Some(latest) = request.latest.as_deref() {
            query.push(("latest", latest));
        }

        let body: HistoryResponse = self
            .get("conversations.history", &self.bot_token, &query)
            .await?;

        let messages = body
            .messages
            .into_iter()
            .map(ApiMessage::into_message)
            .collect();
        Ok((messages, body.has_more))
    }

    async fn fetch_search_page(
        &self,
        query: &str,
        count: u32,
        sort: &str,
    ) -> Result<(Vec<SearchMatch>, u64), SlackError> {
        let token = self
            .user_token
            .as_deref()
            .ok_or(SlackError::UserTokenNotConfigured)?;

        let count = count.to_string();
        let body: SearchResponse = self
            .get(
                "search.messages",
                token,
                &[("query", query), ("count", count.as_str()), ("sort", sort)],
            )
            .await?;

        let results = body.messages.unwrap_or_default();
        let matches = results
            .matches
            .into_iter()
            .map(ApiSearchMatch::into_match)
            .collect();
        Ok((matches, results.total))
    }

    async fn resolve_user(&self, user_id: &str) -> Result<Option<RawUser>, SlackError> {
        let result: Result<UserResponse, SlackError> = self
            .get("users.info", &self.bot_token, &[("user", user_id)])
            .await;

        let body = match result {
            Ok(body) => body,
            Err(SlackError::Unclassified(raw))
                if raw.contains("user_not_found") || raw.contains("users_not_found") =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        Ok(body.user.map(|user| RawUser {
            id: user.id,
            name: user.name,
            display_name: user.profile.display_name,
            real_name: user.profile.real_name,
            is_bot: user.is_bot,
            deleted: user.deleted,
        }))
    }

    async fn identify_self(&self) -> Result<String, SlackError> {
        let body: AuthTestResponse = self.get("auth.test", &self.bot_token, &[]).await?;
        Ok(body.user_id)
    }
}

trait ApiEnvelope {
    fn ok(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

macro_rules! impl_api_envelope {
    ($($ty:ty),+) => {
        $(impl ApiEnvelope for $ty {
            fn ok(&self) -> bool {
                self.ok
            }
            fn error(&self) -> Option<&str> {
                self.error.as_deref()
            }
        })+
    };
}

impl_api_envelope!(HistoryResponse, SearchResponse, UserResponse, AuthTestResponse);

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<ApiMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    thread_ts: Option<String>,
    #[serde(default)]
    reply_count: u32,
}

impl ApiMessage {
    fn into_message(self) -> Message {
        Message {
            user: self.user.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            timestamp: self.ts,
            thread_ts: self.thread_ts,
            reply_count: self.reply_count,
            user_name: None,
            display_name: None,
            real_name: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Option<SearchResults>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResults {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    matches: Vec<ApiSearchMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchMatch {
    #[serde(default)]
    channel: ApiSearchChannel,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    permalink: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSearchChannel {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

impl ApiSearchMatch {
    fn into_match(self) -> SearchMatch {
        SearchMatch {
            channel_id: self.channel.id,
            channel_name: self.channel.name,
            user: self.user.unwrap_or_default(),
            user_name: None,
            display_name: None,
            real_name: None,
            text: self.text.unwrap_or_default(),
            timestamp: self.ts,
            permalink: self.permalink,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    profile: ApiUserProfile,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUserProfile {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    real_name: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user_id: String,
}
