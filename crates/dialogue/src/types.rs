use serde::{Deserialize, Serialize};

/// One structured reply unit from the engine.
///
/// Unknown kinds are carried through (not errors) so the formatter can apply
/// its drop-silently policy; the engine grows new segment types faster than
/// we ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplySegment {
    Text { message: String },
    Media { url: String },
    Unknown { kind: String },
}

/// Wire shape of a single engine reply segment.
#[derive(Debug, Deserialize)]
pub struct RawSegment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl From<RawSegment> for ReplySegment {
    fn from(raw: RawSegment) -> Self {
        match raw.kind.as_str() {
            "text" => {
                let message = raw.payload["message"].as_str().unwrap_or_default().to_string();
                Self::Text { message }
            },
            // The engine labels media segments "image".
            "image" => {
                let url = raw.payload["url"].as_str().unwrap_or_default().to_string();
                Self::Media { url }
            },
            other => Self::Unknown { kind: other.to_string() },
        }
    }
}

/// The action driving one dialogue turn.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: serde_json::Value,
}

impl DialogueAction {
    /// Plain text turn from the user's message body.
    pub fn text(body: &str) -> Self {
        Self {
            kind: "text".into(),
            payload: serde_json::Value::String(body.to_string()),
        }
    }
}

/// Per-user variables pushed to the engine before each fallback turn.
///
/// These are presentation values for the engine's prompts; none of them
/// gates anything on our side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionVariables {
    pub team_name: String,
    pub is_admin: bool,
    pub plan_status: String,
    pub plan_name: String,
    pub user_id: String,
    pub current_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ReplySegment {
        let raw: RawSegment = serde_json::from_str(json).unwrap();
        raw.into()
    }

    #[test]
    fn text_segment_from_wire() {
        let seg = parse(r#"{"type":"text","payload":{"message":"Hi"}}"#);
        assert_eq!(seg, ReplySegment::Text { message: "Hi".into() });
    }

    #[test]
    fn image_segment_becomes_media() {
        let seg = parse(r#"{"type":"image","payload":{"url":"http://x/img.png"}}"#);
        assert_eq!(seg, ReplySegment::Media { url: "http://x/img.png".into() });
    }

    #[test]
    fn unrecognized_kind_is_preserved() {
        let seg = parse(r#"{"type":"carousel","payload":{"cards":[]}}"#);
        assert_eq!(seg, ReplySegment::Unknown { kind: "carousel".into() });
    }

    #[test]
    fn missing_payload_tolerated() {
        let seg = parse(r#"{"type":"text"}"#);
        assert_eq!(seg, ReplySegment::Text { message: String::new() });
    }

    #[test]
    fn action_wire_shape() {
        let action = DialogueAction::text("hello");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "text", "payload": "hello" }));
    }
}
