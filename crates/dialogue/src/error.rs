/// Crate-wide result type for dialogue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Dialogue client errors. The whole engine surface collapses to a single
/// taxonomy error; callers only ever apologize and move on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("conversational engine unavailable: {message}")]
    EngineUnavailable { message: String },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::EngineUnavailable {
            message: message.to_string(),
        }
    }
}
