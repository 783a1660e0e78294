//! Inbound text classification.

/// What an inbound message asks for.
///
/// Classification is pure; authorization happens at dispatch. Checks run in
/// fixed order (join, broadcast, schedule, fallback) and the first match
/// wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `join <code>`: self-enroll into the team exposing that code.
    Join { code: String },
    /// `#update <text>`: admin broadcast to the sender's own team.
    Broadcast { content: String },
    /// `#schedule <text>`: admin schedule update for the sender's own team.
    Schedule { content: String },
    /// Everything else goes to the conversational engine.
    Fallback,
}

const JOIN_PREFIX: &str = "join ";
const BROADCAST_PREFIX: &str = "#update";
const SCHEDULE_PREFIX: &str = "#schedule";

/// Classify a message body.
pub fn parse(body: &str) -> Intent {
    let text = body.trim();

    if starts_with_ignore_ascii_case(text, JOIN_PREFIX) {
        return Intent::Join {
            code: text[JOIN_PREFIX.len()..].trim().to_string(),
        };
    }
    if let Some(rest) = text.strip_prefix(BROADCAST_PREFIX) {
        return Intent::Broadcast {
            content: rest.trim().to_string(),
        };
    }
    if let Some(rest) = text.strip_prefix(SCHEDULE_PREFIX) {
        return Intent::Schedule {
            content: rest.trim().to_string(),
        };
    }
    Intent::Fallback
}

/// ASCII case-insensitive prefix check. A match guarantees `prefix.len()`
/// is a char boundary in `s` (the matched bytes are ASCII).
fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
