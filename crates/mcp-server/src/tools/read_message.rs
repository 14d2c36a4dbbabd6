use rmcp::model::{CallToolResult, Content};

use slack_client::{IdentityResolver, SlackPort};
use slack_protocol::ReadMessageResult;

use super::enrich::{
    annotate_author, build_user_mapping, current_user_snapshot, error_result, success_result,
};
use super::ReadMessageRequest;

/// Reads the message a permalink points at, assembling its thread when
/// either the URL referenced one or the message has replies.
///
/// A thread-fetch failure is deliberately non-fatal: the primary message is
/// still returned, with a textual note appended after the serialized
/// envelope. Parse failures and primary-fetch failures stay fatal.
pub(super) async fn run(
    port: &dyn SlackPort,
    resolver: &IdentityResolver,
    request: ReadMessageRequest,
) -> CallToolResult {
    if request.url.is_empty() {
        return CallToolResult::error(vec![Content::text("missing required argument 'url'")]);
    }

    let coordinate = match slack_permalink::parse(&request.url) {
        Ok(coordinate) => coordinate,
        Err(err) => return error_result("read message", &err),
    };

    let mut message = match port
        .fetch_message(&coordinate.channel_id, &coordinate.timestamp)
        .await
    {
        Ok(message) => message,
        Err(err) => return error_result("read message", &err),
    };
    annotate_author(resolver, &mut message).await;

    let mut result = ReadMessageResult {
        message,
        channel_id: coordinate.channel_id.clone(),
        ..Default::default()
    };

    // Fetch the thread when the URL explicitly referenced one, or when the
    // fetched message is a parent with replies.
    let should_fetch_thread = coordinate.is_thread_reference || result.message.reply_count > 0;
    if should_fetch_thread {
        // A thread URL names its parent in thread_ts; otherwise the fetched
        // message is itself the parent.
        let anchor = coordinate
            .thread_anchor
            .clone()
            .unwrap_or_else(|| result.message.timestamp.clone());

        match port.fetch_thread(&coordinate.channel_id, &anchor).await {
            Ok(mut thread) => {
                for reply in &mut thread {
                    annotate_author(resolver, reply).await;
                }
                result.thread = Some(thread);
            }
            Err(err) => return partial_result(&result, &err),
        }
    }

    let texts: Vec<&str> = std::iter::once(result.message.text.as_str())
        .chain(
            result
                .thread
                .iter()
                .flat_map(|thread| thread.iter().map(|msg| msg.text.as_str())),
        )
        .collect();
    result.user_mapping = build_user_mapping(resolver, texts).await;
    result.current_user = current_user_snapshot(resolver).await;

    success_result(&result)
}

/// Partial success: the primary message serialized as usual, followed by a
/// note naming the thread-fetch failure.
fn partial_result(result: &ReadMessageResult, thread_err: &slack_protocol::SlackError) -> CallToolResult {
    let json = match serde_json::to_string(result) {
        Ok(json) => json,
        Err(err) => {
            return CallToolResult::error(vec![Content::text(format!(
                "Failed to encode partial result: {err}"
            ))])
        }
    };
    CallToolResult::success(vec![Content::text(format!(
        "{json}\n\nNote: Failed to fetch thread replies: {thread_err}"
    ))])
}
