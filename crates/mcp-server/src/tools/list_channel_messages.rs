use rmcp::model::{CallToolResult, Content};

use slack_client::{ChannelPageRequest, IdentityResolver, SlackPort};
use slack_protocol::ListChannelMessagesResult;

use super::enrich::{
    annotate_author, build_user_mapping, current_user_snapshot, error_result, success_result,
};
use super::ListChannelMessagesRequest;

const DEFAULT_LIMIT: i64 = 100;
const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 200;

/// Fetches one reverse-chronological page of channel history. Out-of-range
/// limits are clamped silently; a missing or mistyped `channel_id` is
/// fatal.
pub(super) async fn run(
    port: &dyn SlackPort,
    resolver: &IdentityResolver,
    request: ListChannelMessagesRequest,
) -> CallToolResult {
    if request.channel_id.is_empty() {
        return CallToolResult::error(vec![Content::text(
            "argument 'channel_id' cannot be empty",
        )]);
    }

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT) as u32;
    let page = ChannelPageRequest {
        channel_id: request.channel_id.clone(),
        limit,
        oldest: request.oldest,
        latest: request.latest,
    };

    let (mut messages, has_more) = match port.fetch_channel_page(&page).await {
        Ok(page) => page,
        Err(err) => return error_result("list channel messages", &err),
    };

    for message in &mut messages {
        annotate_author(resolver, message).await;
    }

    let mut result = ListChannelMessagesResult {
        channel_id: request.channel_id,
        has_more,
        ..Default::default()
    };
    let texts: Vec<&str> = messages.iter().map(|msg| msg.text.as_str()).collect();
    result.user_mapping = build_user_mapping(resolver, texts).await;
    result.messages = messages;
    result.current_user = current_user_snapshot(resolver).await;

    success_result(&result)
}
