//! Slack MCP Server
//!
//! Exposes read-only Slack access to AI agents via MCP protocol.
//!
//! ## Tools
//!
//! - `read_message` - Read a message and its thread by Slack URL
//! - `list_channel_messages` - One page of channel history, newest first
//! - `search_messages` - Workspace full-text search (needs a user token)
//!
//! ## Usage
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "slack": {
//!       "command": "slack-mcp",
//!       "env": { "SLACK_BOT_TOKEN": "xoxb-..." }
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::transport::stdio;
use rmcp::ServiceExt;

use slack_client::WebApi;
use slack_mcp::config::ServerConfig;
use slack_mcp::tools::SlackService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ServerConfig::from_env()?;
    let api = WebApi::new(config.bot_token, config.user_token)
        .context("failed to create Slack client")?;

    log::info!("Starting Slack MCP server");

    let service = SlackService::new(Arc::new(api));
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("Slack MCP server stopped");
    Ok(())
}
