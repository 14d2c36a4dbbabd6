//! Slack MCP server library.
//!
//! Exposes three read-only tools over the MCP protocol:
//!
//! - `read_message` - read a message (and its thread) by permalink
//! - `list_channel_messages` - one bounded page of channel history
//! - `search_messages` - one page of workspace full-text search
//!
//! The binary in `main.rs` wires the Slack Web API adapter into
//! [`tools::SlackService`] and serves it over stdio.

pub mod config;
pub mod tools;
