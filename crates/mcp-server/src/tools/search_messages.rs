use rmcp::model::{CallToolResult, Content};

use slack_client::{IdentityResolver, SlackPort};
use slack_protocol::SearchMessagesResult;

use super::enrich::{
    annotate_match_author, current_user_snapshot, error_result, success_result,
};
use super::SearchMessagesRequest;

const DEFAULT_COUNT: i64 = 20;
const MIN_COUNT: i64 = 1;
const MAX_COUNT: i64 = 100;

const SORT_SCORE: &str = "score";
const SORT_TIMESTAMP: &str = "timestamp";

/// Runs one page of workspace full-text search. The count is clamped
/// silently; any sort value other than the two accepted literals falls
/// back to relevance ordering without an error.
pub(super) async fn run(
    port: &dyn SlackPort,
    resolver: &IdentityResolver,
    request: SearchMessagesRequest,
) -> CallToolResult {
    if request.query.is_empty() {
        return CallToolResult::error(vec![Content::text("argument 'query' cannot be empty")]);
    }

    let count = request.count.unwrap_or(DEFAULT_COUNT).clamp(MIN_COUNT, MAX_COUNT) as u32;
    let sort = match request.sort.as_deref() {
        Some(SORT_TIMESTAMP) => SORT_TIMESTAMP,
        // Invalid sort values are silently ignored, defaulting to score.
        _ => SORT_SCORE,
    };

    let (mut matches, total) = match port.fetch_search_page(&request.query, count, sort).await {
        Ok(page) => page,
        Err(err) => return error_result("search messages", &err),
    };

    for found in &mut matches {
        annotate_match_author(resolver, found).await;
    }

    let result = SearchMessagesResult {
        query: request.query,
        total,
        matches,
        current_user: current_user_snapshot(resolver).await,
    };

    success_result(&result)
}
