//! Client for the external conversational engine.
//!
//! The engine is an opaque, stateful per-user dialogue service: the bridge
//! sends one structured action per turn and gets back a list of reply
//! segments. Session variables are pushed ahead of each turn, best-effort.

pub mod error;
pub mod types;
pub mod voiceflow;

use async_trait::async_trait;

pub use {
    error::{Error, Result},
    types::{DialogueAction, ReplySegment, SessionVariables},
    voiceflow::VoiceflowClient,
};

/// Stateful per-user dialogue service.
#[async_trait]
pub trait DialogueClient: Send + Sync {
    /// Run one dialogue turn. All failures collapse to
    /// [`Error::EngineUnavailable`].
    async fn interact(&self, user_id: &str, action: DialogueAction) -> Result<Vec<ReplySegment>>;

    /// Push session variables ahead of a turn. Best-effort: callers log a
    /// failure and proceed to `interact` anyway.
    async fn update_variables(&self, user_id: &str, vars: &SessionVariables) -> Result<()>;
}
