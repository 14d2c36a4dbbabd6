use thiserror::Error;

/// Closed taxonomy of Slack-facing failure conditions.
///
/// Every variant carries a fixed, operator-actionable message; only
/// `Unclassified` forwards the raw transport text verbatim. Keeping the
/// taxonomy as a tagged enum (rather than string codes compared by value)
/// confines the vendor's free-text error surface to [`classify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlackError {
    #[error(
        "Invalid Slack URL format. Expected: \
         https://workspace.slack.com/archives/{{channel_id}}/p{{timestamp}}\n\nDetails: {0}"
    )]
    InvalidUrl(String),

    #[error(
        "Message not found. The message may have been deleted, or the timestamp is incorrect."
    )]
    MessageNotFound,

    #[error("Channel not found. The channel may have been deleted, or the channel ID is incorrect.")]
    ChannelNotFound,

    #[error("The bot is not a member of this channel. Please invite the bot to the channel first.")]
    NotInChannel,

    #[error(
        "Rate limit exceeded. Slack limits API requests to approximately 1 per minute \
         for non-marketplace apps. Please wait and try again."
    )]
    RateLimited,

    #[error(
        "Authentication failed. The Slack token is invalid, expired, or lacks required scopes."
    )]
    InvalidToken,

    #[error("Permission denied. The bot may lack required scopes or the channel is archived.")]
    PermissionDenied,

    #[error(
        "SLACK_USER_TOKEN not configured. The search_messages tool requires a user token \
         (xoxp-) with the search:read scope. Please set the SLACK_USER_TOKEN environment variable."
    )]
    UserTokenNotConfigured,

    #[error("{0}")]
    Unclassified(String),
}

impl SlackError {
    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            SlackError::InvalidUrl(_) => "invalid_url",
            SlackError::MessageNotFound => "message_not_found",
            SlackError::ChannelNotFound => "channel_not_found",
            SlackError::NotInChannel => "not_in_channel",
            SlackError::RateLimited => "rate_limited",
            SlackError::InvalidToken => "invalid_token",
            SlackError::PermissionDenied => "permission_denied",
            SlackError::UserTokenNotConfigured => "user_token_not_configured",
            SlackError::Unclassified(_) => "unclassified",
        }
    }
}

/// Maps a raw Slack API error string onto the taxonomy.
///
/// The Web API reports failures as free-text tokens in the `error` field
/// (`"channel_not_found"`, `"invalid_auth"`, ...), so substring matching is
/// the only available signal. Anything unrecognized passes through as
/// `Unclassified` with the raw text intact.
pub fn classify(raw: &str) -> SlackError {
    if raw.contains("rate_limit") || raw.contains("ratelimited") {
        return SlackError::RateLimited;
    }
    if raw.contains("invalid_auth") || raw.contains("not_authed") {
        return SlackError::InvalidToken;
    }
    if raw.contains("missing_scope") || raw.contains("token_expired") {
        return SlackError::InvalidToken;
    }
    if raw.contains("channel_not_found") {
        return SlackError::ChannelNotFound;
    }
    if raw.contains("not_in_channel") {
        return SlackError::NotInChannel;
    }
    if raw.contains("access_denied") || raw.contains("is_archived") {
        return SlackError::PermissionDenied;
    }
    if raw.contains("message_not_found") || raw.contains("thread_not_found") {
        return SlackError::MessageNotFound;
    }
    SlackError::Unclassified(format!("Slack API error: {raw}"))
}
