use once_cell::sync::Lazy;
use regex::Regex;

/// Inline user mentions as Slack renders them in message text. Channel
/// mentions (`<#C...>`) and special mentions (`<!here>`) are out of scope.
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@(U[A-Z0-9]+)>").expect("mention pattern must compile"));

/// Extracts mentioned user ids from message text, deduplicated in
/// first-occurrence order. Empty when the text has no mentions.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for captures in MENTION_PATTERN.captures_iter(text) {
        let user_id = &captures[1];
        if !seen.iter().any(|existing| existing == user_id) {
            seen.push(user_id.to_string());
        }
    }
    seen
}
