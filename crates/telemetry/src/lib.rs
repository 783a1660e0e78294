//! Fire-and-forget event recording.
//!
//! Telemetry is append-only and strictly best-effort: a failed write is
//! traced locally and never propagated, never retried. Callers go through
//! [`record`] so the swallow-errors policy lives in exactly one place.

pub mod sqlite;

use {async_trait::async_trait, serde::Serialize};

pub use sqlite::SqliteTelemetrySink;

/// What kind of event is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserMessage,
    BotResponse,
    Error,
    Meta,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserMessage => "user_message",
            Self::BotResponse => "bot_response",
            Self::Error => "error",
            Self::Meta => "meta",
        }
    }
}

/// One telemetry record. The session id is the sender's phone number.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryEvent {
    pub session_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
}

impl TelemetryEvent {
    pub fn user_message(session_id: &str, text: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            event_type: EventType::UserMessage,
            payload: serde_json::json!({ "text": text }),
            metadata: Some(serde_json::json!({ "source": "twilio" })),
        }
    }

    pub fn bot_response(session_id: &str, payload: serde_json::Value) -> Self {
        Self {
            session_id: session_id.to_string(),
            event_type: EventType::BotResponse,
            payload,
            metadata: None,
        }
    }

    pub fn error(session_id: &str, message: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            event_type: EventType::Error,
            payload: serde_json::json!({ "error": message }),
            metadata: None,
        }
    }
}

/// Destination for telemetry records.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn append(&self, event: TelemetryEvent) -> anyhow::Result<()>;
}

/// Record an event, swallowing any persistence failure.
pub async fn record(sink: &dyn TelemetrySink, event: TelemetryEvent) {
    let event_type = event.event_type;
    if let Err(e) = sink.append(event).await {
        tracing::warn!(event_type = event_type.as_str(), error = %e, "telemetry append failed");
    }
}
