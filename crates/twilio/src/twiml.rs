//! TwiML rendering for webhook replies.

use teamline_dialogue::ReplySegment;

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render engine reply segments as a TwiML messaging response.
///
/// One `<Message>` per segment, input order preserved: text segments carry a
/// body, media segments carry a `<Media>` reference and no body. Unknown
/// segment kinds are dropped silently (forward compatibility, not an error).
pub fn render(segments: &[ReplySegment]) -> String {
    let mut out = String::from(HEADER);
    out.push_str("<Response>");
    for segment in segments {
        match segment {
            ReplySegment::Text { message } => {
                out.push_str("<Message>");
                out.push_str(&xml_escape(message));
                out.push_str("</Message>");
            },
            ReplySegment::Media { url } => {
                out.push_str("<Message><Media>");
                out.push_str(&xml_escape(url));
                out.push_str("</Media></Message>");
            },
            ReplySegment::Unknown { .. } => {},
        }
    }
    out.push_str("</Response>");
    out
}

/// Render a single text message.
pub fn message(text: &str) -> String {
    render(&[ReplySegment::Text { message: text.into() }])
}

/// An empty response: acknowledge the webhook, send nothing.
pub fn empty() -> String {
    render(&[])
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
