//! Engine errors.

/// Errors talking to a script engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to spawn script engine: {0}")]
    SpawnFailed(String),
    /// Reading from or writing to the engine failed.
    #[error("communication error: {0}")]
    Communication(String),
    /// The engine answered with an error response.
    #[error("engine error [{code}]: {message}")]
    Response { code: i64, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("engine not initialized")]
    NotInitialized,
    #[error("engine process terminated")]
    ProcessTerminated,
    /// A query named a document that was never synced.
    #[error("document not open: {0}")]
    UnknownDocument(String),
}

impl EngineError {
    pub(crate) fn communication(err: impl std::fmt::Display) -> Self {
        Self::Communication(err.to_string())
    }
}
