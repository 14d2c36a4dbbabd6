//! Slack Web API access for the MCP server.
//!
//! The [`SlackPort`] trait is the seam between the tool assemblers and the
//! remote service; [`WebApi`] is the production adapter over the Slack Web
//! API. [`IdentityResolver`] enriches raw user ids with display identities
//! behind a bounded, time-expiring cache, and [`extract_mentions`] pulls
//! `<@U...>` references out of message text.

mod identity;
mod mentions;
mod port;
mod web;

pub use identity::IdentityResolver;
pub use mentions::extract_mentions;
pub use port::{ChannelPageRequest, RawUser, SlackPort};
pub use web::WebApi;
