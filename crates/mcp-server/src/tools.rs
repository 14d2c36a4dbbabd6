//! MCP tools for the Slack server.
//!
//! Three read-only tools over the workspace messaging service. Each tool
//! validates its typed request in one pass, calls the Slack port, enriches
//! the result with resolved identities, and returns a serialized JSON
//! envelope (or a classified error string).

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

use slack_client::{IdentityResolver, SlackPort};

mod enrich;
mod list_channel_messages;
mod read_message;
mod search_messages;

/// Slack MCP service.
#[derive(Clone)]
pub struct SlackService {
    /// Remote messaging/directory port.
    port: Arc<dyn SlackPort>,
    /// Process-wide identity resolver shared by all tool invocations.
    resolver: Arc<IdentityResolver>,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

impl SlackService {
    pub fn new(port: Arc<dyn SlackPort>) -> Self {
        Self {
            resolver: Arc::new(IdentityResolver::new(port.clone())),
            port,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for SlackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only Slack access. Use 'read_message' with a Slack message URL to \
                 retrieve a message and its thread, 'list_channel_messages' for recent \
                 channel history, and 'search_messages' for workspace-wide full-text search."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadMessageRequest {
    /// Slack message or thread URL to read
    #[schemars(
        description = "Slack message or thread URL. Format: https://workspace.slack.com/archives/{channel_id}/p{timestamp}"
    )]
    pub url: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListChannelMessagesRequest {
    /// Channel to list
    #[schemars(description = "Slack channel ID, e.g. C01234567")]
    pub channel_id: String,

    /// Maximum messages to return (default: 100)
    #[schemars(description = "Maximum number of messages (1-200, default 100)")]
    pub limit: Option<i64>,

    /// Only messages after this timestamp
    #[schemars(description = "Only include messages after this Unix timestamp")]
    pub oldest: Option<String>,

    /// Only messages before this timestamp
    #[schemars(description = "Only include messages before this Unix timestamp")]
    pub latest: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchMessagesRequest {
    /// Search query
    #[schemars(description = "Search query, supports Slack search modifiers like in:#channel")]
    pub query: String,

    /// Maximum matches to return (default: 20)
    #[schemars(description = "Maximum number of matches (1-100, default 20)")]
    pub count: Option<i64>,

    /// Result ordering
    #[schemars(description = "Sort order: 'score' (relevance, default) or 'timestamp'")]
    pub sort: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl SlackService {
    /// Read one message (and its thread, when present) by permalink
    #[tool(
        description = "Read a Slack message and its thread by URL. Provide a Slack message URL to retrieve the message content, author, timestamp, and any thread replies."
    )]
    pub async fn read_message(
        &self,
        Parameters(request): Parameters<ReadMessageRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(read_message::run(&*self.port, &self.resolver, request).await)
    }

    /// List one page of channel history, newest first
    #[tool(
        description = "List recent messages from a Slack channel in reverse-chronological order. Supports bounding by timestamp range and page size."
    )]
    pub async fn list_channel_messages(
        &self,
        Parameters(request): Parameters<ListChannelMessagesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(list_channel_messages::run(&*self.port, &self.resolver, request).await)
    }

    /// Full-text search across the workspace
    #[tool(
        description = "Search messages across the Slack workspace. Requires a user token with the search:read scope. Returns one page of matches plus the total match count."
    )]
    pub async fn search_messages(
        &self,
        Parameters(request): Parameters<SearchMessagesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(search_messages::run(&*self.port, &self.resolver, request).await)
    }
}
