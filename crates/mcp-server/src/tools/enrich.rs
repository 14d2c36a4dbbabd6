//! Identity enrichment shared by the three tools.
//!
//! Every step here is best-effort: a failed resolution leaves the message
//! unannotated, drops the mention from the mapping, or omits the
//! current-user snapshot. Failures are logged, never escalated.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use slack_client::{extract_mentions, IdentityResolver};
use slack_protocol::{Message, SearchMatch, SlackError, UserInfo, UserMapping};

/// Attaches resolved author fields to a message. System messages (empty
/// author id) are skipped.
pub(crate) async fn annotate_author(resolver: &IdentityResolver, message: &mut Message) {
    if message.user.is_empty() {
        return;
    }
    match resolver.resolve(&message.user).await {
        Ok(Some(user)) => {
            message.user_name = Some(user.name);
            message.display_name = Some(user.display_name);
            message.real_name = Some(user.real_name);
        }
        Ok(None) => {}
        Err(err) => {
            log::debug!("author resolution failed for {}: {err}", message.user);
        }
    }
}

/// [`annotate_author`] for search matches.
pub(crate) async fn annotate_match_author(resolver: &IdentityResolver, found: &mut SearchMatch) {
    if found.user.is_empty() {
        return;
    }
    match resolver.resolve(&found.user).await {
        Ok(Some(user)) => {
            found.user_name = Some(user.name);
            found.display_name = Some(user.display_name);
            found.real_name = Some(user.real_name);
        }
        Ok(None) => {}
        Err(err) => {
            log::debug!("author resolution failed for {}: {err}", found.user);
        }
    }
}

/// Builds the mention mapping for a set of message texts: every `<@U...>`
/// id that resolves gets an entry; ids that fail to resolve are silently
/// omitted. `None` when nothing resolved (so the field is dropped from the
/// envelope instead of serializing as an empty object).
pub(crate) async fn build_user_mapping<'a, I>(
    resolver: &IdentityResolver,
    texts: I,
) -> Option<UserMapping>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mentioned = Vec::new();
    for text in texts {
        for user_id in extract_mentions(text) {
            if !mentioned.contains(&user_id) {
                mentioned.push(user_id);
            }
        }
    }
    if mentioned.is_empty() {
        return None;
    }

    let mut mapping = UserMapping::new();
    for user_id in mentioned {
        match resolver.resolve(&user_id).await {
            Ok(Some(user)) => {
                mapping.insert(user_id, user);
            }
            Ok(None) => {}
            Err(err) => {
                log::debug!("mention resolution failed for {user_id}: {err}");
            }
        }
    }
    if mapping.is_empty() {
        None
    } else {
        Some(mapping)
    }
}

/// Best-effort snapshot of the authenticated caller's identity.
pub(crate) async fn current_user_snapshot(resolver: &IdentityResolver) -> Option<UserInfo> {
    match resolver.current_identity().await {
        Ok(user) => user,
        Err(err) => {
            log::debug!("current user lookup failed: {err}");
            None
        }
    }
}

/// Serializes an envelope into a successful tool result.
pub(crate) fn success_result<T: Serialize>(envelope: &T) -> CallToolResult {
    match serde_json::to_string(envelope) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(err) => {
            CallToolResult::error(vec![Content::text(format!("Failed to encode result: {err}"))])
        }
    }
}

/// Maps a fatal classified error into a tool error result. Classified
/// kinds carry their fixed remediation text; only `Unclassified` gets the
/// per-tool "Failed to ..." prefix around the verbatim transport message.
pub(crate) fn error_result(action: &str, err: &SlackError) -> CallToolResult {
    let message = match err {
        SlackError::Unclassified(_) => format!("Failed to {action}: {err}"),
        _ => err.to_string(),
    };
    CallToolResult::error(vec![Content::text(message)])
}
