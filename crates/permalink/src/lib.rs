//! Parsing of Slack message permalinks.
//!
//! Reconstructs the internal message coordinate (channel + timestamp +
//! optional thread anchor) from the externally observed URL shapes:
//!
//! - `https://workspace.slack.com/archives/C01234567/p1355517523000008`
//! - `https://workspace.slack.com/archives/C01234567/p1355517523000008?thread_ts=1355517523.000008&cid=C01234567`
//!
//! The grammar is intentionally strict: anything that deviates from
//! `https://{host}.slack.com/archives/{CHANNEL}/p{16 digits}` is rejected
//! with a single `InvalidUrl` error rather than repaired.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use slack_protocol::{MessageCoordinate, SlackError};

static PERMALINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[^/]+\.slack\.com/archives/([A-Z0-9]+)/p(\d+)$")
        .expect("permalink pattern must compile")
});

static THREAD_ANCHOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("thread anchor pattern must compile"));

/// Parser knobs. The default leaves `thread_ts` values unvalidated, which
/// matches the observed behavior of Slack's own clients; malformed anchors
/// then fail at the thread-fetch boundary instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Reject `thread_ts` values that are not of the form `digits.digits`.
    pub validate_thread_anchor: bool,
}

/// Parses a Slack message permalink into a [`MessageCoordinate`].
pub fn parse(permalink: &str) -> Result<MessageCoordinate, SlackError> {
    parse_with_options(permalink, ParseOptions::default())
}

/// [`parse`] with explicit [`ParseOptions`].
pub fn parse_with_options(
    permalink: &str,
    options: ParseOptions,
) -> Result<MessageCoordinate, SlackError> {
    if permalink.is_empty() {
        return Err(SlackError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let parsed = Url::parse(permalink)
        .map_err(|err| SlackError::InvalidUrl(format!("failed to parse URL: {err}")))?;

    let host = parsed.host_str().unwrap_or_default();
    if !host.ends_with(".slack.com") {
        return Err(SlackError::InvalidUrl("URL must be a slack.com URL".to_string()));
    }

    // Query string and fragment are dropped before grammar matching, so
    // unknown parameters and fragments never affect the outcome.
    let base = format!("{}://{}{}", parsed.scheme(), host, parsed.path());
    let captures = PERMALINK_PATTERN.captures(&base).ok_or_else(|| {
        SlackError::InvalidUrl(
            "invalid Slack message URL format. Expected: \
             https://workspace.slack.com/archives/{channel_id}/p{timestamp}"
                .to_string(),
        )
    })?;

    let channel_id = captures[1].to_string();
    let timestamp = convert_timestamp(&captures[2]).map_err(SlackError::InvalidUrl)?;

    let mut coordinate = MessageCoordinate {
        channel_id,
        timestamp,
        thread_anchor: None,
        is_thread_reference: false,
    };

    if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "thread_ts") {
        if !value.is_empty() {
            if options.validate_thread_anchor && !THREAD_ANCHOR_PATTERN.is_match(&value) {
                return Err(SlackError::InvalidUrl(format!(
                    "invalid thread_ts parameter: {value}"
                )));
            }
            coordinate.thread_anchor = Some(value.into_owned());
            coordinate.is_thread_reference = true;
        }
    }

    Ok(coordinate)
}

/// Quick validity predicate without building a coordinate.
pub fn is_message_permalink(permalink: &str) -> bool {
    parse(permalink).is_ok()
}

/// Converts a permalink path timestamp into API format.
///
/// The path carries `p` + 16 digits: 10 seconds digits followed by 6
/// microseconds digits. `1355517523000008` becomes `1355517523.000008`.
pub fn convert_timestamp(raw: &str) -> Result<String, String> {
    if raw.len() != 16 {
        return Err(format!(
            "invalid timestamp format: expected 16 digits, got {}",
            raw.len()
        ));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid timestamp format: contains non-digit characters".to_string());
    }
    Ok(format!("{}.{}", &raw[..10], &raw[10..]))
}
